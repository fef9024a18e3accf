fn main() {
    if let Err(e) = medihelp_lib::run() {
        tracing::error!(error = %e, "MediHelp stopped");
        eprintln!("medihelp: {e}");
        std::process::exit(1);
    }
}
