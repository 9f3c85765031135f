//! Prompt loop and top-level command dispatch.
//!
//! One line per iteration: read, tokenize on single spaces, dispatch,
//! return to the prompt. Command failures are reported on the operator
//! channel and the loop keeps going; only a closed input channel ends it.

use anyhow::Result;

use crate::config::Config;
use crate::console::Console;
use crate::display::Display;
use crate::ops;
use crate::record::RecordStore;
use crate::store::ByteStore;

pub const PROMPT: &str = "idcon:~$ ";

pub struct Context {
    pub config: Config,
    pub records: RecordStore<Box<dyn ByteStore>>,
    pub console: Box<dyn Console>,
    pub display: Box<dyn Display>,
}

pub fn run_repl(ctx: &mut Context) -> Result<()> {
    ctx.console.println("idcon - type 'help' for commands");

    loop {
        let Some(line) = ctx.console.read_line(PROMPT)? else {
            break;
        };
        if let Err(e) = dispatch(ctx, &line) {
            ctx.console.println(&format!("Error: {e}"));
            tracing::error!(error = %e, "command failed");
        }
    }

    Ok(())
}

/// Dispatches one command line. Case-sensitive, single-space token split;
/// an empty line or `exit` is a no-op iteration.
pub fn dispatch(ctx: &mut Context, line: &str) -> Result<()> {
    let mut tokens = line.trim_end_matches(['\r', '\n']).split(' ');
    match tokens.next().unwrap_or("") {
        "" | "exit" => Ok(()),
        "help" => {
            help(ctx.console.as_mut());
            Ok(())
        }
        "user" => ops::handle_user(ctx, tokens.next()),
        "lcd" => {
            let args: Vec<&str> = tokens.collect();
            handle_lcd(ctx, &args);
            Ok(())
        }
        "clear" => {
            ctx.console.clear_screen();
            Ok(())
        }
        other => {
            ctx.console
                .println(&format!("'{other}' is not recognized as a command."));
            ctx.console
                .println("Type 'help' for an overview of all the commands.");
            Ok(())
        }
    }
}

fn help(console: &mut dyn Console) {
    console.println("The commands are:");
    console.println("    user    Performs operations on the user database.");
    console.println("    lcd     Grants access to the character display.");
    console.println("    clear   Clears the terminal window.");
    console.println("Type 'exit' or an empty line to return to the prompt.");
}

/// Parses `lcd` sub-commands and forwards them verbatim to the display.
fn handle_lcd(ctx: &mut Context, args: &[&str]) {
    match args.first().copied() {
        Some("-h" | "--help") => lcd_usage(ctx.console.as_mut()),
        Some("-s" | "--clear") => ctx.display.clear(),
        Some("-p" | "--print") => {
            if args.len() > 1 {
                ctx.display.print(&args[1..].join(" "));
            } else {
                ctx.console
                    .println("Type 'lcd --help' or 'lcd -h' for usage details.");
            }
        }
        Some("-l" | "--line") => ctx.display.next_line(),
        Some("-b" | "--blink") => match on_off(args.get(1).copied()) {
            Some(on) => ctx.display.set_blink(on),
            None => ctx.console.println(
                "Type 'lcd --blink on' to turn on and 'lcd --blink off' to turn off the cursor blink.",
            ),
        },
        Some("-c" | "--cursor") => match on_off(args.get(1).copied()) {
            Some(on) => ctx.display.set_cursor(on),
            None => ctx.console.println(
                "Type 'lcd --cursor on' to turn on and 'lcd --cursor off' to turn off the cursor.",
            ),
        },
        _ => ctx
            .console
            .println("Type 'lcd --help' or 'lcd -h' for usage details."),
    }
}

fn lcd_usage(console: &mut dyn Console) {
    console.println("Usage: lcd [-option] [argument]");
    console.println("Grants access to the character display.");
    console.println("The options are:");
    console.println("    -s    --clear    Clear the display.");
    console.println("    -p    --print    Print the provided phrase on the display.");
    console.println("    -l    --line     Switch the cursor to the second line.");
    console.println("    -b    --blink    [on/off] as argument for cursor blink.");
    console.println("    -c    --cursor   [on/off] as argument for the cursor.");
}

fn on_off(arg: Option<&str>) -> Option<bool> {
    match arg?.to_ascii_lowercase().as_str() {
        "on" => Some(true),
        "off" => Some(false),
        _ => None,
    }
}
