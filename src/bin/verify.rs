use color_eyre::eyre::{bail, eyre, Report};
use tracing::info;

fn get_stack_dir_arg() -> Result<Option<String>, Report> {
    let mut args = std::env::args().skip(1);
    match args.next() {
        None => Ok(None),
        Some(flag) if flag == "-d" => {
            let dir = args
                .next()
                .ok_or_else(|| eyre!("Usage: verify [-d <stack dir>]"))?;
            Ok(Some(dir))
        }
        Some(_) => Err(eyre!("Usage: verify [-d <stack dir>]")),
    }
}

fn main() -> Result<(), Report> {
    color_eyre::install()?;
    tracing_subscriber::fmt::init();

    let stack_dir = get_stack_dir_arg()?.unwrap_or_else(|| ".".to_string());
    let results = macos_host_monitoring::run_all(&stack_dir);
    let failed: Vec<&str> = results
        .iter()
        .filter(|result| !result.passed())
        .map(|result| result.name)
        .collect();
    if !failed.is_empty() {
        bail!(
            "{} of {} checks failed: {}",
            failed.len(),
            results.len(),
            failed.join(", ")
        );
    }
    info!("all {} checks passed", results.len());
    Ok(())
}
