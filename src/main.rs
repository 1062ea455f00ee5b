fn main() {
    #[cfg(feature = "cli")]
    mtgadiff::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("mtgadiff: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
