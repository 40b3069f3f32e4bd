use anyhow::Result;
use clap::Parser;
use cleanroom::{diagnostics, Args, Error, Runner, Settings};
use cleanroom_common::{
    configuration::get_configuration,
    telemetry::{get_subscriber, init_subscriber},
};
use colored::Colorize;
use cpuset::RealFileSystem;
use std::io::Write;
use std::process;
use tracing::{debug, info, warn};

fn main() {
    let args = Args::parse();

    // stdout belongs to the child's output
    let subscriber = get_subscriber("cleanroom".into(), "info".into(), std::io::stderr);
    init_subscriber(subscriber);

    if let Err(e) = run(args) {
        report(&e);
        process::exit(e.downcast_ref::<Error>().map_or(1, Error::exit_code));
    }
}

fn run(args: Args) -> Result<()> {
    let mut settings: Settings = get_configuration()?;
    settings.apply_args(&args);
    debug!(?settings, "Resolved settings");

    if args.diagnostics_only() {
        if args.list_cgroups {
            diagnostics::print_cgroups(&RealFileSystem, &settings.cpuset.cgroup_root)?;
        }
        if args.list_processes {
            diagnostics::print_processes();
        }
        return Ok(());
    }

    let Some(request) = args.request() else {
        anyhow::bail!("No executable given");
    };

    let cpus = settings.cpu_spec()?;
    let host_cpus = num_cpus::get();
    if !cpus.fits(host_cpus) {
        warn!(cpus = %cpus, host_cpus, "Requested CPUs exceed the CPUs of this host");
    }

    let runner = Runner::new(settings.partition()?, settings.settle_delay());
    let output = runner.run(&request)?;
    info!(pid = output.pid, assigned = output.assigned, "wrapped!");

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.stdout.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn report(err: &anyhow::Error) {
    let prefix = "error:".red().bold();
    match err.downcast_ref::<Error>() {
        Some(Error::Child { code, stderr }) => {
            eprintln!("{} child process exited with status {}", prefix, code);
            if !stderr.is_empty() {
                eprint!("{}", stderr);
            }
        }
        // messages of our own errors already carry their cause
        Some(e) => eprintln!("{} {}", prefix, e),
        None => eprintln!("{} {:#}", prefix, err),
    }
}
