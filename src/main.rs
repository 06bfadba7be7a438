mod app;
mod click;
mod config;
mod point;
mod render;
mod store;
mod surface;
mod view;

use app::ClickAnnotateApp;
use config::AppConfig;
use eframe::egui;
use std::path::PathBuf;
use surface::ImageSurface;

const USAGE: &str = "Usage: click-annotate [--config <settings.json>] [image.png|jpg]";

struct Args {
    config: Option<PathBuf>,
    image: Option<PathBuf>,
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut parsed = Args {
        config: None,
        image: None,
    };
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-c" | "--config" => {
                let value = iter.next().ok_or("--config needs a file")?;
                parsed.config = Some(PathBuf::from(value));
            }
            "-h" | "--help" => return Err(String::new()),
            flag if flag.starts_with('-') => return Err(format!("Unknown option: {flag}")),
            path if parsed.image.is_none() => parsed.image = Some(PathBuf::from(path)),
            extra => return Err(format!("Unexpected argument: {extra}")),
        }
    }
    Ok(parsed)
}

fn fail(message: &str) -> ! {
    if !message.is_empty() {
        eprintln!("{message}");
    }
    eprintln!("{USAGE}");
    std::process::exit(1);
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let args = parse_args(&args).unwrap_or_else(|e| fail(&e));

    let config = match AppConfig::discover(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => fail(&e.to_string()),
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .init();

    let Some(image_path) = args.image.or_else(|| config.image_path.clone()) else {
        fail("No image given");
    };
    if !image_path.exists() {
        fail(&format!("File not found: {}", image_path.display()));
    }

    let image = match ImageSurface::open(&image_path) {
        Ok(image) => image,
        Err(e) => fail(&e.to_string()),
    };
    log::info!("Markers kept in {:?} storage", config.storage);

    let title = format!(
        "click-annotate — {}",
        image_path
            .file_name()
            .unwrap_or_default()
            .to_str()
            .unwrap_or("")
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 1000.0])
            .with_title(&title),
        ..Default::default()
    };

    let result = eframe::run_native(
        &title,
        options,
        Box::new(move |_cc| Ok(Box::new(ClickAnnotateApp::new(image, image_path, config)))),
    );
    if let Err(e) = result {
        log::error!("Window closed with error: {e}");
        std::process::exit(1);
    }
}
