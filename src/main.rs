use anyhow::Result;
use chrono::Utc;
use std::process::ExitCode;
use tracing::debug;

use claude_tracker::cli::{Args, Command};
use claude_tracker::config::MonitorConfig;
use claude_tracker::display::{format_error, render_detection, render_info, render_startup};
use claude_tracker::messages::Messages;
use claude_tracker::monitor::{Monitor, build_info_report, load_blocks, resolve_plan};
use claude_tracker::utils::{default_data_paths, discover_data_paths, setup_tracing};

fn main() -> ExitCode {
    let args = Args::parse();
    setup_tracing(args.debug);

    let cfg = match MonitorConfig::from_args(&args) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("{}", format_error(&err.to_string()));
            return ExitCode::FAILURE;
        }
    };

    match run(args.command.as_ref(), &cfg) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", format_error(&format!("{err:#}")));
            ExitCode::FAILURE
        }
    }
}

fn run(command: Option<&Command>, cfg: &MonitorConfig) -> Result<()> {
    let msgs = Messages::english();
    let roots = cfg.data_roots();
    debug!(?roots, plan = ?cfg.plan, "starting");

    if let Some(Command::Info) = command {
        let defaults = default_data_paths();
        let discovered = discover_data_paths(&defaults);
        let blocks = load_blocks(&roots, &cfg.window, Utc::now());
        let report = build_info_report(defaults, discovered, &blocks, &cfg.limits);
        print!("{}", render_info(&report, &msgs));
        return Ok(());
    }

    let detect = cfg.plan.wants_detection(cfg.auto_detect);
    let plan = if detect {
        if !cfg.json {
            println!("🔍 {}", msgs.auto_detecting_plan);
        }
        let blocks = load_blocks(&roots, &cfg.window, Utc::now());
        let (plan, analysis) = resolve_plan(true, cfg.plan.fallback(), &blocks, &cfg.limits);
        if let (false, Some(a)) = (cfg.json, analysis.as_ref()) {
            print!("{}", render_detection(a, &msgs));
        }
        plan
    } else {
        cfg.plan.fallback()
    };

    let mut monitor = Monitor::new(plan, cfg.window.clone(), cfg.limits, roots);
    if cfg.once {
        return monitor.run_once(cfg.json, &msgs);
    }

    print!(
        "{}",
        render_startup(monitor.plan(), cfg.refresh, monitor.roots(), &msgs)
    );
    monitor.run_loop(cfg.refresh, &msgs)
}
