fn main() -> anyhow::Result<()> {
    khasset::cli::run_cli()
}
