use std::process::ExitCode;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use certexp::application::{CheckExpiryUseCase, ProbeConfig};
use certexp::cli::{Cli, OutputFormat};
use certexp::domain::ProbeError;
use certexp::infrastructure::{block_on_bounded, PrtgJsonRenderer, PrtgTextRenderer, SystemClock, TemplateBackend, SHUTDOWN_GRACE};
use certexp::ports::Renderer;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let setup = cli.probe_config().and_then(|config| Ok((config, cli.template_backend()?)));
    let (config, directory) = match setup {
        Ok(v) => v,
        Err(e) => return fail(e),
    };

    match block_on_bounded(async_main(&cli, config, directory), SHUTDOWN_GRACE) {
        Ok(code) => code,
        Err(e) => fail(e),
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "certexp=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("CERTEXP_LOG").unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn async_main(cli: &Cli, config: ProbeConfig, directory: Option<TemplateBackend>) -> ExitCode {
    let use_case = CheckExpiryUseCase::new(cli.certificate_backend(), directory, SystemClock::new(), config);

    let selection = match use_case.execute().await {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    let record = selection.selected();
    debug!(kept = selection.records.len(), value = record.days_remaining, "reporting");

    let rendered = match cli.format {
        OutputFormat::PrtgJson => PrtgJsonRenderer::new().render(&record),
        OutputFormat::PrtgText => PrtgTextRenderer::new().render(&record),
    };
    match rendered {
        Ok(out) => {
            println!("{}", out);
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

fn fail(e: ProbeError) -> ExitCode {
    eprintln!("{}", e);
    ExitCode::from(e.exit_code())
}
