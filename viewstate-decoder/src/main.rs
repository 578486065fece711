/*!
 The command line application that decodes a captured view-state payload and renders
 the resulting object graph.
*/

use std::process::exit;

use crate::{
    app::{
        error::RuntimeError,
        options::{arg_parser, Options, RenderFormat},
        runtime::Config,
    },
    renderers::{json::Json, renderer::Renderer, txt::Txt},
};

mod app;
mod renderers;

fn main() {
    let args = arg_parser().get_matches();
    let options = match Options::from_args(&args) {
        Ok(options) => options,
        Err(why) => exit_with(why),
    };
    if let Err(why) = run(options) {
        exit_with(why);
    }
}

fn run(options: Options) -> Result<(), RuntimeError> {
    let config = Config::new(options)?;
    match config.options.format {
        RenderFormat::Json => Json::new(&config)?.render(),
        RenderFormat::Txt => Txt::new(&config)?.render(),
    }
}

fn exit_with(why: RuntimeError) -> ! {
    eprintln!("{why}");
    exit(why.exit_code())
}
