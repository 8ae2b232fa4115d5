use clap::{error::ErrorKind, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::Result;
use std::path::{Path, PathBuf};
use std::{fs::read_to_string, process::ExitCode};

#[derive(Debug, Parser)]
#[clap(name = "jot", version)]
pub struct CLArgs {
    #[clap(subcommand)]
    pub routine: JotCommand,
}

#[derive(Debug, Subcommand)]
pub enum JotCommand {
    /// Runs a `.jt` script.
    Run {
        path: PathBuf,
        #[clap(long = "format", value_enum, default_value = "basic")]
        format: DiagnosticFormat,
    },
    /// Prints the token stream of a file.
    Tokenize {
        path: PathBuf,
        #[clap(long = "format", value_enum, default_value = "basic")]
        format: TokenFormat,
    },
    /// Prints the parsed program of a file as source text.
    Parse {
        path: PathBuf,
        #[clap(long = "format", value_enum, default_value = "basic")]
        format: ProgramFormat,
    },
}

#[derive(Debug, Clone, ValueEnum)]
pub enum DiagnosticFormat {
    Basic,
    Pretty,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum TokenFormat {
    Basic,
    Line,
    Debug,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ProgramFormat {
    Basic,
    Pretty,
    Debug,
}

const EXTENSION: &str = "jt";

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    jot::init_tracing();

    let args = match CLArgs::try_parse() {
        Ok(args) => args,
        Err(error)
            if matches!(
                error.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
            ) =>
        {
            print!("{error}");
            return Ok(ExitCode::SUCCESS);
        }
        Err(error) => {
            print!("{error}");
            return Ok(ExitCode::FAILURE);
        }
    };

    let succeeded = match args.routine {
        JotCommand::Run { path, format } => run(&path, &format)?,
        JotCommand::Tokenize { path, format } => {
            tracing::info!(?path, "tokenizing");
            let src = read_to_string(path)?;
            tokenize(&src, &format)
        }
        JotCommand::Parse { path, format } => {
            tracing::info!(?path, "parsing");
            let src = read_to_string(&path)?;
            parse(&src, &path, &format)
        }
    };

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run(path: &Path, format: &DiagnosticFormat) -> Result<bool> {
    use jot::interpreter::evaluate;
    use jot::parser::formatter::{BasicProgramFormatter, PrettyProgramFormatter, ProgramFormatter};
    use jot::value::formatter::{BasicFormatter, PrettyFormatter, ValueFormatter};
    use jot::value::Value;

    if !path.exists() {
        println!("file not found: {}", path.display());
        return Ok(false);
    }
    if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
        println!("file must have the .{EXTENSION} extension");
        return Ok(false);
    }

    tracing::info!(?path, "running");
    let src = read_to_string(path)?;

    let program = match jot::parser::parse(&src) {
        Ok(program) => program,
        Err(errors) => {
            let formatter: Box<dyn ProgramFormatter + '_> = match format {
                DiagnosticFormat::Basic => Box::new(BasicProgramFormatter::new(&src)),
                DiagnosticFormat::Pretty => Box::new(PrettyProgramFormatter::new(&src, path)),
            };
            println!("parser errors:");
            for error in errors.iter() {
                println!("{}", formatter.format_error(error));
            }
            return Ok(false);
        }
    };

    let formatter: Box<dyn ValueFormatter + '_> = match format {
        DiagnosticFormat::Basic => Box::new(BasicFormatter),
        DiagnosticFormat::Pretty => Box::new(PrettyFormatter::new(&src, path)),
    };
    match evaluate(&program) {
        Ok(Value::Null) => Ok(true),
        Ok(value) => {
            println!("{}", formatter.format(&value));
            Ok(true)
        }
        Err(error) => {
            println!("{}", formatter.format_error(&error));
            Ok(false)
        }
    }
}

fn tokenize(src: &str, format: &TokenFormat) -> bool {
    use jot::lexer::formatter::{
        BasicFormatter, DebugFormatter, LineFormatter, ToFormatter, TokenFormatter,
    };
    use jot::lexer::{Lexer, TokenKind};

    let mut lexer = Lexer::new(src);
    let formatter: Box<dyn TokenFormatter> = match format {
        TokenFormat::Basic => Box::new(ToFormatter::<BasicFormatter>::create_formatter(&lexer)),
        TokenFormat::Line => Box::new(ToFormatter::<LineFormatter>::create_formatter(&lexer)),
        TokenFormat::Debug => Box::new(ToFormatter::<DebugFormatter>::create_formatter(&lexer)),
    };
    let mut succeeded = true;
    loop {
        let token = lexer.next_token();
        println!("{}", formatter.format(&token));
        match token.kind {
            TokenKind::Eof => return succeeded,
            TokenKind::Illegal => succeeded = false,
            _ => {}
        }
    }
}

fn parse(src: &str, path: &Path, format: &ProgramFormat) -> bool {
    use jot::parser::formatter::{
        BasicProgramFormatter, DebugProgramFormatter, PrettyProgramFormatter, ProgramFormatter,
    };

    let formatter: Box<dyn ProgramFormatter + '_> = match format {
        ProgramFormat::Basic => Box::new(BasicProgramFormatter::new(src)),
        ProgramFormat::Pretty => Box::new(PrettyProgramFormatter::new(src, path)),
        ProgramFormat::Debug => Box::new(DebugProgramFormatter),
    };
    match jot::parser::parse(src) {
        Ok(program) => {
            println!("{}", formatter.format(&program));
            true
        }
        Err(errors) => {
            for error in errors.iter() {
                println!("{}", formatter.format_error(error));
            }
            false
        }
    }
}
