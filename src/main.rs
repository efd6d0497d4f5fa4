use std::path::Path;

use g3dview::{Options, Viewer};

fn main() {
    env_logger::init();

    let mut folder = None;
    let mut options_path = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--options" => options_path = args.next(),
            "--help" | "-h" => {
                log::error!("Usage: g3dview [FOLDER] [--options FILE]");
                return;
            }
            _ => folder = Some(arg),
        }
    }

    let options = match options_path {
        Some(path) => match Options::load(Path::new(&path)) {
            Ok(options) => options,
            Err(e) => {
                log::error!("failed to load options from {path}: {e}");
                std::process::exit(1);
            }
        },
        None => Options::default(),
    };

    let mut builder = Viewer::builder().with_options(options);
    if let Some(folder) = folder {
        builder = builder.with_folder(folder);
    }

    if let Err(e) = builder.run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}
