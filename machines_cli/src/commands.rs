//! Subcommand execution: builds the client, runs a view, prints the result.

use std::io::IsTerminal;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use eyre::WrapErr;
use machines_core::{
    ApiClient, ApiSettings, Command, FileTokenStore, LoginForm, MachineView, MachinesView, Poller,
    QueryParams, Route, ViewError, finish_session, logout, status_badge,
};
use machines_traits::TokenStore;
use machines_traits::clock::MonotonicClock;
use machines_ui::{Style, render_badge, render_detail, render_table};
use serde_json::json;

use crate::cli::{Commands, json_mode};

/// Everything a subcommand needs, resolved once from flags and config.
pub struct Context {
    pub client: ApiClient,
    pub session: FileTokenStore,
    pub style: Style,
}

impl Context {
    pub fn new(settings: ApiSettings, sim: bool, token_file: &std::path::Path) -> eyre::Result<Self> {
        let client = if sim {
            tracing::info!("using simulated backend");
            ApiClient::builder()
                .with_backend(machines_http::SimulatedBackend::with_demo_fleet())
                .with_settings(settings)
                .build()?
        } else {
            tracing::debug!(backend = %settings.backend_url, "using HTTP backend");
            ApiClient::connect(settings)?
        };
        let style = Style {
            ansi: !json_mode() && std::io::stdout().is_terminal(),
        };
        Ok(Self {
            client,
            session: FileTokenStore::new(token_file),
            style,
        })
    }
}

fn print_json(v: &serde_json::Value) {
    println!("{v}");
}

fn id_params(id: Option<&str>) -> QueryParams {
    match id {
        Some(id) => QueryParams::new().with("id", id),
        None => QueryParams::new(),
    }
}

pub fn run(ctx: &mut Context, cmd: &Commands) -> eyre::Result<()> {
    match cmd {
        Commands::Login { phone, password } => login(ctx, phone, password),
        Commands::Logout => {
            let next = logout(&mut ctx.session)?;
            if json_mode() {
                print_json(&json!({ "ok": true, "next": next.path() }));
            } else {
                println!("Logged out.");
            }
            Ok(())
        }
        Commands::List { csv } => list(ctx, *csv),
        Commands::Show { id } => show(ctx, &id_params(id.as_deref())),
        Commands::Start { id } => press(ctx, Command::Start, id.as_deref()),
        Commands::Pause { id } => press(ctx, Command::Pause, id.as_deref()),
        Commands::Resume { id } => press(ctx, Command::Resume, id.as_deref()),
        Commands::Finish { id } => press(ctx, Command::Finish, id.as_deref()),
        Commands::FinishSession { key, parking_name } => {
            let mut params = QueryParams::new();
            if let Some(k) = key {
                params = params.with("key", k.as_str());
            }
            if let Some(p) = parking_name {
                params = params.with("parking_name", p.as_str());
            }
            finish(ctx, &params)
        }
        Commands::Open { route } => open(ctx, route),
        Commands::Watch {
            id,
            interval_ms,
            count,
        } => watch(ctx, id.as_deref(), *interval_ms, *count),
    }
}

fn login(ctx: &mut Context, phone: &str, password: &str) -> eyre::Result<()> {
    let next = LoginForm::new(phone, password).submit(&ctx.client, &mut ctx.session)?;
    if json_mode() {
        print_json(&json!({ "ok": true, "next": next.path() }));
    } else {
        println!("Logged in.");
    }
    Ok(())
}

fn list(ctx: &Context, csv: bool) -> eyre::Result<()> {
    let view = MachinesView::open(&ctx.client, &ctx.session)?;
    if json_mode() {
        print_json(&serde_json::to_value(view.machines())?);
    } else if csv {
        let mut w = csv::Writer::from_writer(std::io::stdout());
        w.write_record(["id", "state", "status", "voltage", "ip_addr"])?;
        for m in view.machines() {
            w.write_record([
                m.id.clone(),
                m.state.code().to_string(),
                status_badge(m.state).label.to_string(),
                m.voltage.to_string(),
                m.ip_addr.clone(),
            ])?;
        }
        w.flush().wrap_err("failed to write CSV")?;
    } else {
        print!("{}", render_table(&view.rows(), ctx.style));
    }
    Ok(())
}

fn print_view(ctx: &Context, view: &MachineView) {
    let model = view.model();
    if json_mode() {
        print_json(&json!({
            "machine": model.machine,
            "status": { "label": model.badge.label, "color": model.badge.color.name() },
            "enabled": model.panel.enabled_commands().iter().map(|c| c.name()).collect::<Vec<_>>(),
            "error": model.error,
        }));
    } else {
        print!("{}", render_detail(&model, ctx.style));
    }
}

fn show(ctx: &Context, params: &QueryParams) -> eyre::Result<()> {
    let view = MachineView::open(&ctx.client, &ctx.session, params)?;
    print_view(ctx, &view);
    Ok(())
}

fn press(ctx: &Context, command: Command, id: Option<&str>) -> eyre::Result<()> {
    let mut view = MachineView::open(&ctx.client, &ctx.session, &id_params(id))?;
    let from = view.state();
    match view.press(command) {
        Ok(to) => {
            if !json_mode() {
                println!("{command}: {from} -> {to}");
            }
            print_view(ctx, &view);
            Ok(())
        }
        // Nothing was sent; the view is unchanged.
        Err(e @ ViewError::CommandDisabled { .. }) => Err(e.into()),
        Err(e) => {
            print_view(ctx, &view);
            Err(e.into())
        }
    }
}

fn finish(ctx: &Context, params: &QueryParams) -> eyre::Result<()> {
    let out = finish_session(&ctx.client, &ctx.session, params)?;
    if json_mode() {
        print_json(&json!({ "ok": true, "message": out.message, "next": out.next.path() }));
    } else {
        println!("{}", out.message);
    }
    Ok(())
}

fn open(ctx: &mut Context, route: &str) -> eyre::Result<()> {
    let Some(parsed) = Route::parse(route) else {
        eyre::bail!("unknown route `{route}`");
    };
    tracing::debug!(route = %parsed, "opening route");
    match parsed {
        // Home lands on the list, which itself redirects to login without a session.
        Route::Home | Route::Machines => list(ctx, false),
        Route::Login => {
            if ctx.session.load().is_some() {
                println!("Already logged in.");
                Ok(())
            } else {
                Err(ViewError::LoginRequired.into())
            }
        }
        Route::Machine(params) => show(ctx, &params),
        Route::FinishSession(params) => finish(ctx, &params),
    }
}

fn watch(ctx: &Context, id: Option<&str>, interval_ms: u64, count: Option<u64>) -> eyre::Result<()> {
    let Some(token) = ctx.session.load() else {
        return Err(ViewError::LoginRequired.into());
    };
    let Some(id) = id.filter(|s| !s.trim().is_empty()) else {
        return Err(ViewError::MissingMachineId.into());
    };
    if interval_ms == 0 {
        eyre::bail!("--interval-ms must be >= 1");
    }

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        ctrlc::set_handler(move || stop.store(true, Ordering::Relaxed))
            .wrap_err("failed to install Ctrl-C handler")?;
    }

    let interval = Duration::from_millis(interval_ms);
    let poller = Poller::spawn(
        ctx.client.clone(),
        token,
        id.to_string(),
        interval,
        MonotonicClock::new(),
    );
    let wait = interval.max(Duration::from_millis(100)) + ctx.client.settings().timeout;
    let mut seen = 0u64;
    while !stop.load(Ordering::Relaxed) && count.is_none_or(|n| seen < n) {
        let Some(snapshot) = poller.recv_timeout(wait) else {
            continue;
        };
        seen += 1;
        match snapshot {
            Ok(m) => {
                if json_mode() {
                    print_json(&json!({ "machine": m, "status": status_badge(m.state).label }));
                } else {
                    println!(
                        "{} {} {} V {}",
                        m.id,
                        render_badge(status_badge(m.state), ctx.style),
                        m.voltage,
                        m.ip_addr
                    );
                }
            }
            Err(e) => {
                tracing::warn!(detail = %e.detail(), "poll failed");
                if json_mode() {
                    print_json(&json!({ "error": e.to_string() }));
                } else {
                    println!("{id} error: {e}");
                }
            }
        }
    }
    tracing::debug!(snapshots = seen, polls = poller.polls(), "watch stopped");
    Ok(())
}
