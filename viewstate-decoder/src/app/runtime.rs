/*!
 Resolves the command line options into a decoded stream ready to render.
*/

use std::{
    fs::{self, File},
    io::{stdout, BufWriter, Write},
};

use nrbf_stream::{
    records::parser::{NrbfReader, ParsedStream},
    util::viewstate::decode_envelope,
};

use crate::app::{error::RuntimeError, options::Options};

/// Data that is setup from the application's options: the decoded stream and
/// the choices that drive rendering
pub struct Config {
    pub options: Options,
    /// The outer parse result; nested payloads hang off of it
    pub stream: ParsedStream,
}

impl Config {
    /// Read the input, unwrap the envelope when asked to, and run the parser once.
    pub fn new(options: Options) -> Result<Self, RuntimeError> {
        let raw = fs::read(&options.input_path)
            .map_err(|why| RuntimeError::ReadError(why, options.input_path.clone()))?;

        let bytes = if options.decode_base64 {
            decode_envelope(&String::from_utf8_lossy(&raw)).map_err(RuntimeError::EnvelopeError)?
        } else {
            raw
        };

        let stream = NrbfReader::from(&bytes)
            .parse()
            .map_err(RuntimeError::ParseError)?;

        Ok(Config { options, stream })
    }

    /// The handle renderers write into, a file when one was requested
    pub fn writer(&self) -> Result<Box<dyn Write>, RuntimeError> {
        match &self.options.output_path {
            Some(path) => {
                let file = File::create(path)
                    .map_err(|why| RuntimeError::CreateError(why, path.clone()))?;
                Ok(Box::new(BufWriter::new(file)))
            }
            None => Ok(Box::new(BufWriter::new(stdout()))),
        }
    }
}
