use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use md2jira::{Config, DEFAULT_CONFIG};

/// Config file picked up from the working directory when `--config` is absent.
const LOCAL_CONFIG_FILE: &str = "md2jira.toml";

#[derive(Parser)]
#[command(name = "md2jira")]
#[command(about = "Convert Markdown files to Jira text formatting notation")]
struct Cli {
    /// Input Markdown file
    #[arg(required_unless_present = "init_config")]
    input: Option<PathBuf>,

    /// Output file (defaults to <export_path>/<input name>.jira)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the result instead of writing a file
    #[arg(long, conflicts_with = "output")]
    stdout: bool,

    /// Config file (defaults to ./md2jira.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Drop this heading line but keep its content (repeatable)
    #[arg(long, value_name = "TEXT")]
    omit_heading: Vec<String>,

    /// Drop this heading and its whole section (repeatable)
    #[arg(long, value_name = "TEXT")]
    ignore_section: Vec<String>,

    /// Number of levels to shift headings down (0-5)
    #[arg(long, value_name = "N")]
    heading_shift: Option<u8>,

    /// Render headings as bold text
    #[arg(long)]
    bold_headings: bool,

    /// Drop image alt text from the output
    #[arg(long)]
    no_image_descriptions: bool,

    /// Write the default config file to PATH and exit
    #[arg(long, value_name = "PATH")]
    init_config: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if let Some(path) = &cli.init_config {
        if path.exists() {
            fail(&format!("{} already exists", path.display()));
        }
        if let Err(e) = fs::write(path, DEFAULT_CONFIG) {
            fail(&format!("Error writing {}: {}", path.display(), e));
        }
        println!("Created {}", path.display());
        return;
    }

    let Some(input) = cli.input.clone() else {
        fail("no input file given");
    };

    let config = apply_overrides(load_config(cli.config.as_deref()), &cli);

    // Read input file
    let markdown = match fs::read_to_string(&input) {
        Ok(content) => content,
        Err(e) => fail(&format!("Error reading {}: {}", input.display(), e)),
    };

    // Convert markdown to the target notation
    let converted = match md2jira::convert(&markdown, &config) {
        Ok(text) => text,
        Err(e) => fail(&format!("Invalid configuration: {}", e)),
    };

    if cli.stdout {
        print!("{}", converted);
        return;
    }

    // Determine output path
    let output = match cli.output {
        Some(output) => output,
        None => default_output_path(&input, &config),
    };

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent) {
            fail(&format!("Error creating {}: {}", parent.display(), e));
        }
    }

    if let Err(e) = fs::write(&output, converted) {
        fail(&format!("Error writing {}: {}", output.display(), e));
    }

    println!("Created {}", output.display());
}

fn load_config(explicit: Option<&Path>) -> Config {
    let path = explicit.unwrap_or(Path::new(LOCAL_CONFIG_FILE));
    match Config::load_from_path(path) {
        Ok(Some(config)) => {
            log::info!("Loaded config from {}", path.display());
            config
        }
        Ok(None) if explicit.is_some() => {
            fail(&format!("Config file {} not found", path.display()))
        }
        Ok(None) => {
            log::info!("No {} found, using defaults", LOCAL_CONFIG_FILE);
            Config::default()
        }
        Err(e) => fail(&e.to_string()),
    }
}

fn apply_overrides(mut config: Config, cli: &Cli) -> Config {
    config.omit_headings.extend(cli.omit_heading.iter().cloned());
    config.ignore_sections.extend(cli.ignore_section.iter().cloned());
    if let Some(shift) = cli.heading_shift {
        config.heading_shift = shift;
    }
    if cli.bold_headings {
        config.convert_headings_to_bold = true;
    }
    if cli.no_image_descriptions {
        config.keep_image_descriptions = false;
    }
    config
}

fn default_output_path(input: &Path, config: &Config) -> PathBuf {
    let extension = config
        .export_format
        .parse::<md2jira::ExportFormat>()
        .map(|format| format.extension())
        .unwrap_or("txt");
    let file_name = input.with_extension(extension);
    let file_name = file_name.file_name().unwrap_or(file_name.as_os_str());
    config.export_path.join(file_name)
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}
