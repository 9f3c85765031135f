//! `user` operation handlers: login, add, delete, show.
//!
//! Every privileged handler re-runs the admin gate itself; there is no
//! session state. All failures are reported on the operator channel and
//! scope to the current command; nothing here terminates the process.

use anyhow::Result;

use crate::cli::Context;
use crate::console::Console;
use crate::display;
use crate::record::{AdminToken, SlotId, User};

pub fn handle_user(ctx: &mut Context, sub: Option<&str>) -> Result<()> {
    match sub {
        Some("-h" | "--help") => {
            user_usage(ctx.console.as_mut());
            Ok(())
        }
        Some("-l" | "--login") => login(ctx),
        Some("-a" | "--add") => add(ctx),
        Some("-d" | "--delete") => delete(ctx),
        Some("-s" | "--show") => show(ctx),
        _ => {
            ctx.console
                .println("Type 'user --help' or 'user -h' for usage details.");
            Ok(())
        }
    }
}

fn user_usage(console: &mut dyn Console) {
    console.println("Usage: user [-option]");
    console.println("Performs operations on the user database.");
    console.println("The options are:");
    console.println("    -l    --login     Authenticate a user with an ID and Password.");
    console.println("    -a    --add       Add a user to the database. (Requires admin privileges)");
    console.println(
        "    -d    --delete    Delete a user entry from the database. (Requires admin privileges)",
    );
    console.println("    -s    --show      Show the entire database. (Requires admin privileges)");
}

/// Outcome of one admin-gate check.
enum Gate {
    Granted(AdminToken),
    Denied,
    Closed,
}

/// Prompts for the admin credential pair and checks it against the
/// injected configuration. Which field was wrong is deliberately not
/// reported; a non-numeric entry denies like any other mismatch.
fn gate(ctx: &mut Context) -> Result<Gate> {
    let Some(id) = ctx.console.read_line("Enter Admin ID: ")? else {
        return Ok(Gate::Closed);
    };
    let Some(pw) = ctx.console.read_secret("Enter Admin Password: ")? else {
        return Ok(Gate::Closed);
    };

    let admin = &ctx.config.admin;
    match (id.trim().parse::<u32>(), pw.trim().parse::<u32>()) {
        (Ok(id), Ok(pw)) if id == admin.id && pw == admin.password => {
            Ok(Gate::Granted(AdminToken::grant()))
        }
        _ => {
            tracing::warn!("admin gate denied");
            Ok(Gate::Denied)
        }
    }
}

/// Reads a numeric field. `Ok(None)` means the current command should
/// abort: either the channel closed, or the entry was malformed, which
/// is rejected outright, never defaulted to zero.
fn prompt_number(console: &mut dyn Console, prompt: &str) -> Result<Option<u64>> {
    let Some(text) = console.read_line(prompt)? else {
        return Ok(None);
    };
    match text.trim().parse::<u64>() {
        Ok(n) => Ok(Some(n)),
        Err(_) => {
            console.println("Invalid number.");
            Ok(None)
        }
    }
}

fn prompt_password(console: &mut dyn Console, prompt: &str) -> Result<Option<u32>> {
    let Some(text) = console.read_secret(prompt)? else {
        return Ok(None);
    };
    match text.trim().parse::<u32>() {
        Ok(n) => Ok(Some(n)),
        Err(_) => {
            console.println("Invalid number.");
            Ok(None)
        }
    }
}

fn is_yes(choice: &str) -> bool {
    matches!(choice.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn print_user(console: &mut dyn Console, user: &User) {
    console.println(&format!("ID: {}", user.id()));
    console.println(&format!("Data: {}", user.data_text()));
}

/// Authenticates a user against their stored record. Unlimited retries,
/// one per invocation.
fn login(ctx: &mut Context) -> Result<()> {
    let Some(raw) = prompt_number(ctx.console.as_mut(), "Enter User ID: ")? else {
        return Ok(());
    };
    let user = match SlotId::new(raw) {
        Some(id) => ctx.records.read(id)?,
        // An id that cannot exist reads the same as an empty slot.
        None => None,
    };
    let Some(user) = user else {
        ctx.console.println("User does not exist.");
        return Ok(());
    };

    let Some(candidate) = prompt_password(ctx.console.as_mut(), "Enter User Password: ")? else {
        return Ok(());
    };
    if user.authenticate(candidate) {
        ctx.console.println("Authentication Complete.");
        print_user(ctx.console.as_mut(), &user);
        display::mirror_user(ctx.display.as_mut(), &user);
        tracing::info!(id = %user.id(), "login succeeded");
    } else {
        ctx.console.println("Authentication Failed.");
        ctx.console.alert();
        tracing::warn!(id = %user.id(), "login failed");
    }
    Ok(())
}

/// Adds or overwrites a record. Overwriting an occupied slot takes a
/// yes/no confirmation; anything but y/yes aborts silently.
fn add(ctx: &mut Context) -> Result<()> {
    let _token = match gate(ctx)? {
        Gate::Granted(token) => token,
        Gate::Denied => {
            ctx.console.println("Not an admin.");
            return Ok(());
        }
        Gate::Closed => return Ok(()),
    };

    let Some(raw) = prompt_number(ctx.console.as_mut(), "Enter User ID between 0 and 63: ")? else {
        return Ok(());
    };
    let Some(id) = SlotId::new(raw) else {
        ctx.console.println("ID must be between 0 and 63.");
        return Ok(());
    };

    if ctx.records.read(id)?.is_some() {
        let Some(choice) = ctx
            .console
            .read_line("User already exists. Overwrite? (y) / (n): ")?
        else {
            return Ok(());
        };
        if !is_yes(&choice) {
            return Ok(());
        }
    }

    let Some(password) = prompt_password(ctx.console.as_mut(), "Enter User Password: ")? else {
        return Ok(());
    };
    let Some(data) = ctx.console.read_line("Enter User Data: ")? else {
        return Ok(());
    };

    let user = User::new(id, password, data.as_bytes());
    ctx.records.write(&user)?;
    tracing::info!(id = %id, "record written");
    Ok(())
}

/// Overwrites the slot with the sentinel record. No existence check, no
/// confirmation, not reversible.
fn delete(ctx: &mut Context) -> Result<()> {
    let _token = match gate(ctx)? {
        Gate::Granted(token) => token,
        Gate::Denied => {
            ctx.console.println("Not an admin.");
            return Ok(());
        }
        Gate::Closed => return Ok(()),
    };

    let Some(raw) = prompt_number(ctx.console.as_mut(), "Enter User ID to be deleted: ")? else {
        return Ok(());
    };
    let Some(id) = SlotId::new(raw) else {
        ctx.console.println("ID must be between 0 and 63.");
        return Ok(());
    };

    ctx.records.erase(id)?;
    ctx.console.println(&format!("User {id} is deleted."));
    tracing::info!(id = %id, "record erased");
    Ok(())
}

/// Lists every present record, password included; the cleartext listing
/// is what the admin capability buys.
fn show(ctx: &mut Context) -> Result<()> {
    let token = match gate(ctx)? {
        Gate::Granted(token) => token,
        Gate::Denied => {
            ctx.console.println("Not an admin.");
            return Ok(());
        }
        Gate::Closed => return Ok(()),
    };

    ctx.console.println("User Database:");
    for id in SlotId::all() {
        let Some(user) = ctx.records.read(id)? else {
            continue;
        };
        print_user(ctx.console.as_mut(), &user);
        let password = user.password().reveal(&token);
        ctx.console.println(&format!("Password: {password}"));
    }
    Ok(())
}
