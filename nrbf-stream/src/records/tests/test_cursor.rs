#[cfg(test)]
mod cursor_tests {
    use crate::{
        error::nrbf::NrbfError,
        records::{
            cursor::ByteCursor,
            models::{PrimitiveKind, Value},
        },
    };

    /// The inverse of the cursor's 7-bit length prefix, for round-trip tests
    fn encode_var_int(mut value: u64) -> Vec<u8> {
        let mut out = vec![];
        loop {
            let mut byte = (value & 0x7f) as u8;
            value >>= 7;
            if value != 0 {
                byte |= 0x80;
            }
            out.push(byte);
            if value == 0 {
                break;
            }
        }
        out
    }

    fn encode_var_string(text: &str) -> Vec<u8> {
        let mut out = encode_var_int(text.len() as u64);
        out.extend_from_slice(text.as_bytes());
        out
    }

    #[test]
    fn can_read_little_endian_widths() {
        let bytes: Vec<u8> = vec![
            0x2a, // u8
            0x34, 0x12, // i16
            0x78, 0x56, 0x34, 0x12, // i32
            0xef, 0xcd, 0xab, 0x89, 0x67, 0x45, 0x23, 0x01, // i64
        ];
        let mut cursor = ByteCursor::from(&bytes);

        assert_eq!(cursor.read_u8().unwrap(), 0x2a);
        assert_eq!(cursor.read_i16().unwrap(), 0x1234);
        assert_eq!(cursor.read_i32().unwrap(), 0x12345678);
        assert_eq!(cursor.read_i64().unwrap(), 0x0123456789abcdef);
        assert_eq!(cursor.position(), bytes.len());
    }

    #[test]
    fn can_round_trip_little_endian_integers() {
        let value: i32 = -1234567;
        let bytes = value.to_le_bytes();
        let mut cursor = ByteCursor::from(&bytes);

        assert_eq!(cursor.read_i32().unwrap().to_le_bytes(), bytes);
    }

    #[test]
    fn can_read_floats() {
        let mut bytes = 1.5f32.to_le_bytes().to_vec();
        bytes.extend((-2.5f64).to_le_bytes());
        let mut cursor = ByteCursor::from(&bytes);

        assert_eq!(cursor.read_f32().unwrap(), 1.5);
        assert_eq!(cursor.read_f64().unwrap(), -2.5);
    }

    #[test]
    fn cant_read_past_end() {
        let bytes: Vec<u8> = vec![0x01, 0x02];
        let mut cursor = ByteCursor::from(&bytes);

        assert!(matches!(
            cursor.read_i32(),
            Err(NrbfError::UnexpectedEof(4, 2))
        ));
    }

    #[test]
    fn peek_does_not_advance() {
        let bytes: Vec<u8> = vec![0x07];
        let mut cursor = ByteCursor::from(&bytes);

        assert_eq!(cursor.peek().unwrap(), 0x07);
        assert_eq!(cursor.position(), 0);
        assert_eq!(cursor.read_u8().unwrap(), 0x07);
        assert!(matches!(cursor.peek(), Err(NrbfError::UnexpectedEof(1, 1))));
    }

    #[test]
    fn can_seek_anywhere_inside_the_stream() {
        let bytes: Vec<u8> = vec![0x00, 0x01, 0x02, 0x03];
        let mut cursor = ByteCursor::from(&bytes);

        cursor.seek(3).unwrap();
        assert_eq!(cursor.read_u8().unwrap(), 0x03);

        // The end is a legal position, one past it is not
        cursor.seek(4).unwrap();
        assert!(!cursor.has_remaining());
        assert!(matches!(cursor.seek(5), Err(NrbfError::UnexpectedEof(5, 4))));
    }

    #[test]
    fn can_read_empty_var_string() {
        let bytes: Vec<u8> = vec![0x00];
        let mut cursor = ByteCursor::from(&bytes);

        assert_eq!(cursor.read_var_string().unwrap(), "");
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn can_round_trip_var_string_lengths() {
        for length in [0usize, 1, 127, 128, 300, 16383, 16384, 1 << 18] {
            let text = "a".repeat(length);
            let bytes = encode_var_string(&text);
            let mut cursor = ByteCursor::from(&bytes);

            assert_eq!(cursor.read_var_string().unwrap(), text);
            assert_eq!(cursor.position(), bytes.len());
        }
    }

    #[test]
    fn can_read_multibyte_length_prefix() {
        // 300 = 0b10_0101100: low group 0xAC with continuation, high group 0x02
        let mut bytes: Vec<u8> = vec![0xac, 0x02];
        bytes.extend(std::iter::repeat(b'x').take(300));
        let mut cursor = ByteCursor::from(&bytes);

        assert_eq!(cursor.read_var_string().unwrap().len(), 300);
    }

    #[test]
    fn cant_read_overlong_length_prefix() {
        let bytes: Vec<u8> = vec![0x80, 0x80, 0x80, 0x80, 0x80];
        let mut cursor = ByteCursor::from(&bytes);

        assert!(matches!(
            cursor.read_var_string(),
            Err(NrbfError::InvalidVarInt(0))
        ));
    }

    #[test]
    fn cant_read_invalid_utf8() {
        let bytes: Vec<u8> = vec![0x02, 0xff, 0xfe];
        let mut cursor = ByteCursor::from(&bytes);

        assert!(matches!(
            cursor.read_var_string(),
            Err(NrbfError::InvalidUtf8(_))
        ));
    }

    #[test]
    fn can_read_one_byte_primitives() {
        let bytes: Vec<u8> = vec![0x01, 0x00, 0x41, 0x80];
        let mut cursor = ByteCursor::from(&bytes);

        assert_eq!(
            cursor.read_primitive(PrimitiveKind::Boolean).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            cursor.read_primitive(PrimitiveKind::Boolean).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            cursor.read_primitive(PrimitiveKind::Char).unwrap(),
            Value::Byte(0x41)
        );
        assert_eq!(
            cursor.read_primitive(PrimitiveKind::SByte).unwrap(),
            Value::Byte(0x80)
        );
    }

    #[test]
    fn can_read_numeric_primitives() {
        let mut bytes: Vec<u8> = vec![];
        bytes.extend((-2i16).to_le_bytes());
        bytes.extend(40000u16.to_le_bytes());
        bytes.extend(7i32.to_le_bytes());
        bytes.extend(u64::MAX.to_le_bytes());
        bytes.extend(1.5f32.to_le_bytes());
        bytes.extend(2.25f64.to_le_bytes());
        let mut cursor = ByteCursor::from(&bytes);

        assert_eq!(
            cursor.read_primitive(PrimitiveKind::Int16).unwrap(),
            Value::Int16(-2)
        );
        assert_eq!(
            cursor.read_primitive(PrimitiveKind::UInt16).unwrap(),
            Value::UInt16(40000)
        );
        assert_eq!(
            cursor.read_primitive(PrimitiveKind::Int32).unwrap(),
            Value::Int32(7)
        );
        assert_eq!(
            cursor.read_primitive(PrimitiveKind::UInt64).unwrap(),
            Value::UInt64(u64::MAX)
        );
        assert_eq!(
            cursor.read_primitive(PrimitiveKind::Single).unwrap(),
            Value::Float32(1.5)
        );
        assert_eq!(
            cursor.read_primitive(PrimitiveKind::Double).unwrap(),
            Value::Float64(2.25)
        );
    }

    #[test]
    fn can_read_time_span_as_ticks() {
        let bytes = 600_000_000i64.to_le_bytes();
        let mut cursor = ByteCursor::from(&bytes);

        assert_eq!(
            cursor.read_primitive(PrimitiveKind::TimeSpan).unwrap(),
            Value::Int64(600_000_000)
        );
    }

    #[test]
    fn can_read_decimal_as_text() {
        let bytes: Vec<u8> = encode_var_string("12.34");
        let mut cursor = ByteCursor::from(&bytes);

        assert_eq!(
            cursor.read_primitive(PrimitiveKind::Decimal).unwrap(),
            Value::String("12.34".to_string())
        );
    }

    #[test]
    fn date_time_is_kept_opaque() {
        let bytes: Vec<u8> = (0..64).collect();
        let mut cursor = ByteCursor::from(&bytes);

        let result = cursor.read_primitive(PrimitiveKind::DateTime).unwrap();
        assert_eq!(result, Value::Opaque((0..64).collect()));
        assert_eq!(cursor.position(), 64);
    }

    #[test]
    fn null_reads_no_bytes() {
        let bytes: Vec<u8> = vec![0x01];
        let mut cursor = ByteCursor::from(&bytes);

        assert_eq!(
            cursor.read_primitive(PrimitiveKind::Null).unwrap(),
            Value::Null
        );
        assert_eq!(cursor.position(), 0);
    }
}
