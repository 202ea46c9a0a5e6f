//! Command-line front end (§6): the archive/source-tree conversions are
//! library code in `pasrc-pkg`/`pasrc-layout`/`pasrc-dsl`; this binary is
//! only argument dispatch, diagnostics printing, and exit codes.

mod commands;
mod error;

use std::process::ExitCode;

use error::Error;

fn version_string() -> String {
    format!("pasrc {}", env!("CARGO_PKG_VERSION"))
}

fn main() -> ExitCode {
    if let Err(e) = pasrc_diag::init_diag(&version_string()) {
        eprintln!("{e}");
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(true) => ExitCode::from(0),
        Ok(false) => ExitCode::from(1),
        Err(Error::Usage) => {
            eprintln!("{}", Error::Usage);
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(1)
        }
    }
}

fn run(args: &[String]) -> Result<bool, Error> {
    let as_str: Vec<&str> = args.iter().map(String::as_str).collect();
    match as_str.as_slice() {
        ["-unpack", pkg] => commands::unpack(pkg, None),
        ["-unpack", pkg, out_dir] => commands::unpack(pkg, Some(out_dir)),
        ["-pack", pkg, src_dir] => commands::pack(pkg, src_dir),
        ["-make", pkg, pkgs_dir, pa_file] => commands::make(pkg, pkgs_dir, pa_file),
        ["-test", pkg] => commands::test_one(pkg),
        ["-testall", dir] => commands::test_all(dir),
        _ => Err(Error::Usage),
    }
}
