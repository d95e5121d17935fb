use clap::Parser;
use std::io::Read;

use just_zsh::interpreter::words::split_command_words;
use just_zsh::{run_builtin, BuiltinTable, ShellState};

#[derive(Parser)]
#[command(name = "just-zsh")]
#[command(about = "A zsh-flavored builtin command engine")]
#[command(version)]
struct Cli {
    /// Execute the builtin command lines from the argument
    #[arg(short = 'c')]
    script: Option<String>,

    /// POSIX-compatibility mode for readonly/export handling
    #[arg(long = "posix")]
    posix: bool,

    /// Restricted mode: protected parameters cannot be altered
    #[arg(long = "restricted")]
    restricted: bool,

    /// Trace builtin invocations on stderr
    #[arg(short = 'x', long = "xtrace")]
    xtrace: bool,

    /// Output results as JSON (stdout, stderr, exitCode)
    #[arg(long = "json")]
    json: bool,

    /// Script file to execute
    #[arg()]
    script_file: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    // Determine script source: -c, file, or stdin.
    let script = if let Some(s) = cli.script {
        s
    } else if let Some(ref file) = cli.script_file {
        match std::fs::read_to_string(file) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error: cannot read script file: {}: {}", file, e);
                std::process::exit(1);
            }
        }
    } else {
        use std::io::IsTerminal;
        if std::io::stdin().is_terminal() {
            eprintln!("Error: no script provided. Use -c 'commands', a file, or stdin.");
            std::process::exit(1);
        }
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).unwrap_or_default();
        buf
    };

    let mut state = ShellState::with_env(std::env::vars());
    state.options.posix_builtins = cli.posix;
    state.options.restricted = cli.restricted;
    state.options.xtrace = cli.xtrace;
    let mut table = BuiltinTable::new();

    let mut stdout = String::new();
    let mut stderr = String::new();
    let mut exit_code = 0;

    for line in script.lines().flat_map(|l| l.split(';')) {
        let words = split_command_words(line);
        if words.is_empty() {
            continue;
        }
        match run_builtin(&mut state, &mut table, &words[0], &words[1..]) {
            Some(result) => {
                stdout.push_str(&result.stdout);
                stderr.push_str(&result.stderr);
                exit_code = result.exit_code;
            }
            None => {
                stderr.push_str(&format!("just-zsh: command not found: {}\n", words[0]));
                exit_code = 127;
            }
        }
    }

    if cli.json {
        println!(
            "{}",
            serde_json::json!({
                "stdout": stdout,
                "stderr": stderr,
                "exitCode": exit_code,
            })
        );
    } else {
        if !stdout.is_empty() {
            print!("{}", stdout);
        }
        if !stderr.is_empty() {
            eprint!("{}", stderr);
        }
    }

    std::process::exit(exit_code);
}
