//! The bundled demo suite: `tagtest --list`, `tagtest python`,
//! `tagtest -- -knownfailure`.

use std::process::ExitCode;
use tagtest::{Harness, Registry};

#[path = "../demos/test_network.rs"]
mod test_network;
#[path = "../demos/test_perl/mod.rs"]
mod test_perl;
#[path = "../demos/test_python.rs"]
mod test_python;

fn main() -> ExitCode {
    let mut registry = Registry::new();
    registry
        .register("test_python", test_python::register)
        .register("test_perl", test_perl::register)
        .register("test_network", test_network::register);

    Harness::new(registry)
        .dir(concat!(env!("CARGO_MANIFEST_DIR"), "/demos"))
        .run_from_env()
        .into()
}
