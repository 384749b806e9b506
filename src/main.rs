use clap::Parser;
use gw::cli::{Cli, Commands};
use gw::config::Config;
use gw::exec::Invocation;
use gw::output::{OutputMode, Reporter};
use gw::security::{
    Action, ExecutionContext, Intent, InteractivitySignals, Prompter, Registry, TerminalPrompter,
};
use gw::{exit_codes, logging, GwError, GwResult, Pipeline, Request};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let reporter = Reporter::new(OutputMode::from_flags(cli.json, cli.agent));

    let code = match run(cli, &reporter) {
        Ok(code) => code,
        Err(e) => {
            reporter.failure(&e, &[]);
            exit_codes::for_error(&e)
        }
    };

    std::process::exit(code);
}

fn run(cli: Cli, reporter: &Reporter) -> GwResult<i32> {
    let config = Config::load()?;
    let intent = Intent::new(cli.write, cli.force);

    // --json and --agent callers cannot answer a prompt
    let signals = InteractivitySignals::from_env().with_structured_output(cli.json || cli.agent);
    let context = ExecutionContext::from_signals(&signals, config.safety.rate_limit_warn_threshold);

    match cli.command {
        Commands::Tiers => {
            let protected = config.protected_set();
            reporter.tiers(&Registry::new().entries(), &protected.names());
            Ok(exit_codes::OK)
        }
        Commands::Check {
            domain,
            action,
            target,
        } => {
            let action = Action::parse(&domain, &action, target.as_deref())
                .map_err(|e| GwError::InvalidAction(e.to_string()))?;
            let pipeline = Pipeline::from_config(&config, &std::env::current_dir()?, context, TerminalPrompter);
            let evaluation = pipeline.evaluate(&action, &intent);
            reporter.evaluation(&action, &evaluation);

            Ok(if evaluation.decision.is_deny() {
                exit_codes::DENIED
            } else {
                exit_codes::OK
            })
        }
        Commands::Git(command) => {
            let mut pipeline = Pipeline::from_config(&config, &std::env::current_dir()?, context, TerminalPrompter);
            let (action, invocation) = command.plan(|| pipeline.current_branch())?;
            Ok(execute(&mut pipeline, reporter, action, intent, invocation))
        }
        Commands::Gh(command) => {
            let mut pipeline = Pipeline::from_config(&config, &std::env::current_dir()?, context, TerminalPrompter);
            let (action, invocation) = command.plan(config.github.repo.as_deref());
            Ok(execute(&mut pipeline, reporter, action, intent, invocation))
        }
    }
}

/// Run one gated action and report it, warnings included either way.
fn execute<P: Prompter>(
    pipeline: &mut Pipeline<P>,
    reporter: &Reporter,
    action: Action,
    intent: Intent,
    mut invocation: Invocation,
) -> i32 {
    // A streamed child would write straight onto the JSON document
    if reporter.mode() == OutputMode::Json {
        invocation.stream = false;
    }

    match pipeline.run(Request {
        action,
        intent,
        invocation,
    }) {
        Ok(completed) => {
            reporter.success(&completed);
            exit_codes::OK
        }
        Err(e) => {
            reporter.failure(&e, pipeline.warnings());
            exit_codes::for_error(&e)
        }
    }
}
