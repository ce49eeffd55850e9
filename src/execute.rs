use std::path::PathBuf;
use anyhow::{Context, Result};
use reqs::installed::{list_installed, list_sources};
use reqs::installer::{npm_install, pip_install, SystemInstaller};
use reqs::locate::find_package_dirs;
use reqs::merge::flatten;
use reqs::resolve::{EmptyPolicy, Resolver, Source};
use reqs::{Config, Manifest, ManifestKey, Platform, Tool};
use tracing::{info, warn};
use crate::cli::CLI;

pub fn execute(cli: CLI) -> Result<()> {
    let config = Config::load_or_default(cli.config.as_deref())
        .context("Could not load config")?;
    let mut platform = Platform::detect(cli.tool.or(config.tool))?;

    if cli.sources {
        return execute_sources(&platform);
    }
    if cli.yml {
        return execute_yml(&cli, &config, &platform);
    }
    if cli.stdout || cli.with_version {
        return execute_list(&cli, &config, &platform);
    }
    execute_install(&cli, &config, &mut platform)
}

fn list_with_sudo(cli: &CLI, config: &Config) -> bool {
    cli.list_sudo || config.list_with_sudo
}

pub fn execute_sources(platform: &Platform) -> Result<()> {
    let sources = list_sources(platform.tool)?;
    if sources.is_empty() {
        warn!("{} has no sources to list", platform.tool);
    } else {
        println!("{sources}");
    }
    Ok(())
}

pub fn execute_list(cli: &CLI, config: &Config, platform: &Platform) -> Result<()> {
    let installed = list_installed(platform.tool, cli.with_version, list_with_sudo(cli, config))?;
    println!("{installed}");
    Ok(())
}

pub fn execute_yml(cli: &CLI, config: &Config, platform: &Platform) -> Result<()> {
    let installed = list_installed(platform.tool, cli.with_version, list_with_sudo(cli, config))?;
    let mut manifest = Manifest::new();
    manifest.insert(
        ManifestKey::System(platform.tool),
        installed.lines().map(String::from).collect(),
    );
    print!("{}", manifest.to_yaml()?);
    Ok(())
}

/// The source for the system tool.
fn system_source(cli: &CLI) -> Source {
    if !cli.dir.is_empty() {
        Source::Dirs(cli.dir.clone())
    } else if let Some(file) = &cli.file {
        Source::File(file.clone())
    } else if cli.stdin {
        Source::Stdin
    } else {
        Source::current_dir()
    }
}

/// The source for pip and npm. Standard input only feeds the system tool,
/// so these fall back to the current directory.
fn ecosystem_source(cli: &CLI) -> Source {
    match system_source(cli) {
        Source::Stdin => Source::current_dir(),
        source => source,
    }
}

/// Directories searched for npm packages.
fn package_roots(cli: &CLI) -> Vec<PathBuf> {
    if cli.dir.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        cli.dir.clone()
    }
}

pub fn execute_install(cli: &CLI, config: &Config, platform: &mut Platform) -> Result<()> {
    let recurse = cli.recurse || config.recurse;
    let system_policy = if cli.dry_run { EmptyPolicy::Warn } else { EmptyPolicy::Fail };
    let system_resolver = Resolver::new(platform, recurse).with_empty_policy(system_policy);
    let resolver = Resolver::new(platform, recurse).with_empty_policy(EmptyPolicy::Warn);

    let system_source = system_source(cli);
    let ecosystem_source = ecosystem_source(cli);

    let system_reqs = flatten(&system_resolver.resolve(&system_source, Tool::System(platform.tool))?);
    let pip = match cli.pip_path() {
        Some(path) => Some((path, flatten(&resolver.resolve(&ecosystem_source, Tool::Pip)?))),
        None => None,
    };
    let pip3 = match cli.pip3_path() {
        Some(path) => Some((path, flatten(&resolver.resolve(&ecosystem_source, Tool::Pip3)?))),
        None => None,
    };
    let npm = match cli.npm_requested() {
        true => Some(flatten(&resolver.resolve(&ecosystem_source, Tool::Npm)?)),
        false => None,
    };

    if cli.dry_run {
        println!("{}: {}", platform.tool, system_reqs);
        if let Some((_, reqs)) = &pip {
            println!("{}: {}", Tool::Pip, reqs);
        }
        if let Some((_, reqs)) = &pip3 {
            println!("{}: {}", Tool::Pip3, reqs);
        }
        if let Some(reqs) = &npm {
            println!("{}: {}", Tool::Npm, reqs);
        }
        return Ok(());
    }

    platform.bootstrap().context("Could not install Homebrew")?;
    let installer = SystemInstaller::new(platform, cli.force, cli.quiet);
    if cli.update || cli.upgrade {
        installer.update()?;
    }
    if cli.upgrade {
        installer.upgrade()?;
    }
    installer.install(&system_reqs)
        .with_context(|| format!("Could not install {} requirements", platform.tool))?;

    if let Some((pip_path, reqs)) = pip {
        install_pip(&reqs, &pip_path, cli.spip, cli)?;
    }
    if let Some((pip_path, reqs)) = pip3 {
        install_pip(&reqs, &pip_path, cli.spip3, cli)?;
    }
    if let Some(reqs) = npm {
        install_npm(&reqs, cli, config, recurse)?;
    }
    Ok(())
}

fn install_pip(reqs: &str, pip_path: &str, sudo: bool, cli: &CLI) -> Result<()> {
    if reqs.is_empty() {
        info!("No {pip_path} requirements to install");
        return Ok(());
    }
    pip_install(reqs, pip_path, sudo, cli.upgrade, cli.quiet)
        .with_context(|| format!("Could not install {pip_path} requirements"))
}

fn install_npm(reqs: &str, cli: &CLI, config: &Config, recurse: bool) -> Result<()> {
    if reqs.is_empty() {
        info!("No global npm requirements to install");
    } else {
        npm_install(reqs, None, cli.snpm, true, cli.quiet)
            .context("Could not install global npm requirements")?;
    }
    for root in package_roots(cli) {
        for package_dir in find_package_dirs(&root, recurse, config.npm_exclude.as_slice())? {
            npm_install("", Some(package_dir.as_path()), false, false, cli.quiet)
                .with_context(|| format!("npm install failed in {}", package_dir.display()))?;
        }
    }
    Ok(())
}
