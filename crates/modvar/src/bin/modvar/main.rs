mod cli;

use modvar::context::EvalContext;
use modvar::inputs::{self, Inputs};

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("MODVAR_LOG"))
        .with_writer(std::io::stderr)
        .init();

    for new_path in cli.directory.iter() {
        match new_path.canonicalize() {
            Err(e) => {
                eprintln!(
                    "Failed to resolve path for -C/--directory {}\n{}",
                    new_path.display(),
                    e
                );
                std::process::exit(1);
            }
            Ok(cwd) => {
                if let Err(err) = std::env::set_current_dir(&cwd) {
                    eprintln!("Failed to set work directory to {}\n{}", cwd.display(), err,);
                    std::process::exit(1);
                }

                tracing::info!(directory=%cwd.display(), "Changed working directory");
            }
        }
    }

    let command_result = match cli.command {
        cli::Command::Evaluate(eval_cli) => evaluate(eval_cli),
        cli::Command::Dev(dev_cli) => dev(dev_cli),
    };

    if let Err(e) = command_result {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

pub fn evaluate(cli: cli::EvaluateCommand) -> anyhow::Result<()> {
    let tree = modvar::loader::load_module(&cli.input.dir)?;
    let root_inputs = root_inputs(&cli.input)?;

    let ctx = EvalContext::new();
    modvar::eval::evaluate_tree(&tree, &root_inputs, &ctx)?;

    output(&cli.output, &ctx)?;
    Ok(())
}

fn root_inputs(input: &cli::InputArgs) -> anyhow::Result<Inputs> {
    let env = inputs::from_env(inputs::ENV_PREFIX, std::env::vars());

    let var_files = input
        .var_files
        .iter()
        .map(|file_path| inputs::load_var_file(file_path))
        .collect::<Result<Vec<_>, _>>()?;

    let assignments = input
        .vars
        .iter()
        .map(|assignment| inputs::parse_assignment(assignment))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(inputs::merge(env, var_files, assignments))
}

fn output(output: &cli::OutputArgs, ctx: &EvalContext) -> anyhow::Result<()> {
    let snapshot = ctx.snapshot();
    match output.format {
        cli::OutputFormat::Yaml => serde_yaml::to_writer(std::io::stdout(), &snapshot)?,
        cli::OutputFormat::Json => serde_json::to_writer_pretty(std::io::stdout(), &snapshot)?,
    };

    Ok(())
}

/// (modvar-)developer utilities
///
/// A quick way to expose internal structures for debugging purposes
pub fn dev(cli: cli::DevCommand) -> anyhow::Result<()> {
    use cli::DevSubCommand::*;

    let tree = modvar::loader::load_module(&cli.dir)?;

    match cli.command {
        Tree => println!("{tree:#?}"),
    }

    Ok(())
}
