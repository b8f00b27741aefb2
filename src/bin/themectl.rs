// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use themectl::{
    assets::AssetSynchronizer,
    config::ThemectlConfig,
    doctor::{diagnose, Severity},
    engine::{
        background::BackgroundCycler,
        cycle::{CycleEngine, Direction},
        ApplyEngine,
    },
    hooks::{desktop::WallpaperHook, HookContext, HookReport, HookRunner, HookStatus},
    hotkeys::{flatten_bindings, load_manifest},
    path::{config_path_in, home_dir, Layout},
    state::StateStore,
    syscall::Environment,
    theme::{Theme, ThemeRepository},
};

use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::{path::PathBuf, process::exit};
use tracing::{error, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "themectl [options] <command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    fn run(self) -> Result<()> {
        if let Command::Version = self.command {
            return run_version();
        }

        let ctx = Context::load(self.config)?;
        match self.command {
            Command::Apply(opts) => run_apply(&ctx, opts),
            Command::Cycle(opts) => run_cycle(&ctx, opts),
            Command::Background(opts) => run_background(&ctx, opts),
            Command::SyncAssets => run_sync_assets(&ctx),
            Command::Status => run_status(&ctx),
            Command::Doctor => run_doctor(&ctx),
            Command::Hotkeys => run_hotkeys(&ctx),
            Command::Version => run_version(),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Apply a theme and update runtime symlinks.
    #[command(override_usage = "themectl apply [options] <theme>")]
    Apply(ApplyOptions),

    /// Cycle themes in configured order.
    #[command(override_usage = "themectl cycle [options]")]
    Cycle(CycleOptions),

    /// Cycle wallpapers of current theme.
    #[command(override_usage = "themectl background [options]")]
    Background(CycleOptions),

    /// Render asset directories for every theme.
    #[command(name = "sync-assets", override_usage = "themectl sync-assets [options]")]
    SyncAssets,

    /// Show current theme and available themes.
    #[command(override_usage = "themectl status [options]")]
    Status,

    /// Run health checks.
    #[command(override_usage = "themectl doctor [options]")]
    Doctor,

    /// List hotkey bindings.
    #[command(override_usage = "themectl hotkeys [options]")]
    Hotkeys,

    /// Print themectl version.
    Version,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct ApplyOptions {
    /// Slug, name, or display name of theme to apply.
    #[arg(required = true, value_name = "theme")]
    pub theme: String,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct CycleOptions {
    /// Cycle direction, next or prev.
    #[arg(short, long, default_value = "next", value_name = "direction")]
    pub direction: Direction,
}

/// Everything a command needs, resolved once.
struct Context {
    config: ThemectlConfig,
    layout: Layout,
    state: StateStore,
    repository: ThemeRepository,
}

impl Context {
    fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let home = home_dir()?;
        let config_path = config_path.unwrap_or_else(|| config_path_in(&home));
        let config = ThemectlConfig::load(&config_path)?;
        let layout = Layout::resolve(home, &config);
        let state = StateStore::new(&layout.state_file, &layout.background_state_file);
        let repository = ThemeRepository::load(&layout.metadata);

        Ok(Self {
            config,
            layout,
            state,
            repository,
        })
    }

    fn hook_context<'a>(&'a self, theme: &'a Theme, env: &'a Environment) -> HookContext<'a> {
        HookContext {
            theme,
            config: &self.config,
            layout: &self.layout,
            env,
        }
    }
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_timer(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

fn run() -> Result<()> {
    Cli::parse().run()
}

fn run_apply(ctx: &Context, opts: ApplyOptions) -> Result<()> {
    let engine = ApplyEngine::new(&ctx.layout, &ctx.state);
    let (theme, _) = engine.apply_query(&ctx.repository, &opts.theme)?;
    reload(ctx, theme, HookRunner::default());
    println!("Applied {} on {}", theme.display_name, ctx.config.platform);

    Ok(())
}

fn run_cycle(ctx: &Context, opts: CycleOptions) -> Result<()> {
    let cycle = CycleEngine::new(ctx.config.order.cycle.iter().cloned());
    let Some(theme) = cycle.cycle(&ctx.repository, &ctx.state, opts.direction) else {
        bail!("no themes available to cycle");
    };

    ApplyEngine::new(&ctx.layout, &ctx.state).apply(theme)?;
    reload(ctx, theme, HookRunner::default());
    println!("Cycled to {} ({})", theme.display_name, opts.direction);

    Ok(())
}

fn run_background(ctx: &Context, opts: CycleOptions) -> Result<()> {
    let current = ctx
        .state
        .current_theme()
        .ok_or_else(|| anyhow!("no theme applied yet, run `themectl apply <theme>` first"))?;
    let theme = ApplyEngine::new(&ctx.layout, &ctx.state).resolve(&ctx.repository, &current)?;

    let chosen = BackgroundCycler::new(&ctx.layout, &ctx.state).cycle(&theme.slug, opts.direction)?;
    reload(ctx, theme, HookRunner::new(vec![Box::new(WallpaperHook)]));
    println!("Background now {}", chosen.display());

    Ok(())
}

fn run_sync_assets(ctx: &Context) -> Result<()> {
    if ctx.repository.is_empty() {
        bail!(
            "no themes found in {:?}, cannot sync assets",
            ctx.layout.metadata.display()
        );
    }

    let bar = ProgressBar::new(ctx.repository.len() as u64);
    let style = ProgressStyle::with_template(
        "{elapsed_precise:.green}  {msg:<30}  [{wide_bar:.yellow/blue}] {pos}/{len}",
    )?
    .progress_chars("-Cco.");
    bar.set_style(style);

    let synchronizer = AssetSynchronizer::new(&ctx.layout.themes_root);
    let report = synchronizer.sync(&ctx.repository, &bar)?;
    for missing in report.missing_wallpapers() {
        warn!("wallpaper {:?} was not found", missing.display());
    }
    println!(
        "Synchronized {} theme(s) under {}",
        report.themes.len(),
        ctx.layout.themes_root.display()
    );

    Ok(())
}

fn run_status(ctx: &Context) -> Result<()> {
    let current = ctx.state.current_theme();
    println!("Platform:       {}", ctx.config.platform);
    println!("Theme metadata: {}", ctx.layout.metadata.display());
    println!("State file:     {}", ctx.layout.state_file.display());
    if let Some(current) = &current {
        println!("Current theme:  {current}");
    }

    if ctx.repository.is_empty() {
        println!("No theme metadata found");
        return Ok(());
    }

    let rows: Vec<[String; 3]> = ctx
        .repository
        .iter()
        .map(|theme| {
            let marker = match current.as_deref().is_some_and(|current| theme.matches(current)) {
                true => "* ",
                false => "  ",
            };
            let editors = [
                theme.nvim_colorscheme().map(|_| "nvim"),
                theme.vscode_theme().map(|_| "vscode"),
                theme.cursor_theme().map(|_| "cursor"),
            ]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(", ");
            let wallpaper = theme
                .wallpapers
                .first()
                .and_then(|path| path.file_name())
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "-".into());
            [
                format!("{marker}{}", theme.display_name),
                if editors.is_empty() { "-".into() } else { editors },
                wallpaper,
            ]
        })
        .collect();

    let name_width = rows.iter().map(|row| row[0].len()).max().unwrap_or(0).max(6);
    let editor_width = rows.iter().map(|row| row[1].len()).max().unwrap_or(0).max(7);
    println!();
    println!("{:<name_width$}  {:<editor_width$}  Wallpaper", "  Name", "Editors");
    for [name, editors, wallpaper] in rows {
        println!("{name:<name_width$}  {editors:<editor_width$}  {wallpaper}");
    }

    Ok(())
}

fn run_doctor(ctx: &Context) -> Result<()> {
    let report = diagnose(&ctx.layout, &ctx.state);
    for check in &report.checks {
        let label = match (check.passed, check.severity) {
            (true, _) => "ok",
            (false, Severity::Warning) => "warning",
            (false, Severity::Error) => "error",
        };
        println!("[{label:^7}] {}: {}", check.name, check.detail);
    }

    if !report.passed() {
        bail!("health checks failed");
    }
    println!("All checks passed");

    Ok(())
}

fn run_hotkeys(ctx: &Context) -> Result<()> {
    let manifest = load_manifest(&ctx.layout.hotkeys_file)?;
    let rows = flatten_bindings(&manifest);
    let width = rows.iter().map(|(action, _)| action.len()).max().unwrap_or(0);
    for (action, binding) in rows {
        println!("{action:<width$}  {binding}");
    }

    Ok(())
}

fn run_version() -> Result<()> {
    println!("themectl {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}

// INVARIANT: Hook failures are reported, never propagated.
fn reload(ctx: &Context, theme: &Theme, runner: HookRunner) {
    let env = Environment::from_process();
    let reports = runner.run(&ctx.hook_context(theme, &env));
    let failed: Vec<&HookReport> = reports
        .iter()
        .filter(|report| matches!(report.status, HookStatus::Failed(_)))
        .collect();
    if !failed.is_empty() {
        let labels: Vec<&str> = failed.iter().map(|report| report.label).collect();
        warn!("some reload hooks failed: {}", labels.join(", "));
    }
}
