//! # 剪贴板结构检查器 — 命令行入口
//!
//! 本文件只负责参数解析、配置加载与输出格式选择。
//! 解码逻辑分布在库的各子模块中，详见 `lib.rs` 架构文档。

use std::fs;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use clap::{Parser, Subcommand};
use serde::Serialize;

use clipboard_inspector::codec::{DecodedStruct, ObjectBuilder};
use clipboard_inspector::error::AppError;
use clipboard_inspector::format::{
    CapturedFormat, ClipboardSnapshot, drop_file_paths, format_display_name, standard::CF_HDROP,
};
use clipboard_inspector::schema::{Catalog, enumerate_fields};
use clipboard_inspector::settings::{InspectorSettings, OutputFormat, load_settings_from_path};
use clipboard_inspector::{docs, render};

#[derive(Parser)]
#[command(name = "clipboard-inspector")]
#[command(about = "Decode raw Windows clipboard structures", long_about = None)]
struct Cli {
    /// JSON settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Handle width in bytes (4 or 8)
    #[arg(long, global = true)]
    pointer_width: Option<u8>,

    /// Print JSON instead of indented text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a raw buffer against a named structure
    Decode {
        structure: String,
        file: PathBuf,
    },
    /// Decode a raw buffer by clipboard format id
    Format {
        /// Decimal or 0x-prefixed format id
        id: String,
        file: PathBuf,
        /// Registered format name
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Flag formats that were probably synthesized, given the enumeration order
    Classify {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Show documentation and layout for a structure or format
    Describe { name: String },
    /// List compiled-in structures
    List,
}

fn main() {
    let cli = Cli::parse();

    let mut settings = cli
        .config
        .as_deref()
        .map(load_settings_from_path)
        .unwrap_or_default();
    if cli.pointer_width.is_some() {
        settings.pointer_width = cli.pointer_width;
    }
    if cli.json {
        settings.output = OutputFormat::Json;
    }

    let filter = settings.log_filter.clone().unwrap_or_else(|| "info".to_string());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    if let Err(err) = run(cli.command, &settings) {
        log::error!("❌ {err}");
        std::process::exit(1);
    }
}

fn run(command: Commands, settings: &InspectorSettings) -> Result<(), AppError> {
    let options = settings.decode_options()?;
    let builder = ObjectBuilder::new(Catalog::builtin(), options);
    let output = settings.output;

    match command {
        Commands::Decode { structure, file } => {
            let data = read_buffer(&file)?;
            let decoded = builder.build_named(&structure, &data)?;
            print_struct(&decoded, output)
        }
        Commands::Format { id, file, name } => {
            let id = parse_id(&id)?;
            let data = read_buffer(&file)?;
            run_format(&builder, id, name, data, output)
        }
        Commands::Classify { ids } => {
            let order = ids.iter().map(|id| parse_id(id)).collect::<Result<Vec<_>, _>>()?;
            run_classify(order, output)
        }
        Commands::Describe { name } => run_describe(&name, output),
        Commands::List => run_list(&builder, output),
    }
}

fn read_buffer(path: &Path) -> Result<Vec<u8>, AppError> {
    let data = fs::read(path)?;
    log::info!("读取 {}（{} 字节）", path.display(), data.len());
    Ok(data)
}

fn parse_id(text: &str) -> Result<u32, AppError> {
    docs::parse_format_id(text)
        .ok_or_else(|| AppError::InvalidArgument(format!("无法解析格式号: {text}")))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::InvalidArgument(format!("序列化输出失败: {e}")))?;
    println!("{text}");
    Ok(())
}

fn print_struct(decoded: &DecodedStruct, output: OutputFormat) -> Result<(), AppError> {
    match output {
        OutputFormat::Json => print_json(decoded),
        OutputFormat::Text => {
            print!("{}", render::render_struct(decoded));
            Ok(())
        }
    }
}

fn run_format(
    builder: &ObjectBuilder<'_>,
    id: u32,
    name: Option<String>,
    data: Vec<u8>,
    output: OutputFormat,
) -> Result<(), AppError> {
    let data = Bytes::from(data);
    let snapshot =
        ClipboardSnapshot::from_captured(vec![CapturedFormat::new(id, name, Some(data.clone()))]);
    let entry = snapshot
        .entries()
        .first()
        .ok_or_else(|| AppError::InvalidArgument("快照为空".to_string()))?;

    let Some(decoded) = snapshot.decode_entry(entry, builder)? else {
        return Err(AppError::InvalidArgument(format!(
            "格式 {} 没有对应的结构描述",
            entry.name()
        )));
    };
    let files = if id == CF_HDROP { drop_file_paths(&data)? } else { Vec::new() };

    match output {
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct FormatOutput<'a> {
                format: &'a str,
                decoded: &'a DecodedStruct,
                #[serde(skip_serializing_if = "Vec::is_empty")]
                files: Vec<String>,
            }
            print_json(&FormatOutput { format: entry.name(), decoded: &decoded, files })
        }
        OutputFormat::Text => {
            println!("{} (0x{:04X})", entry.name(), id);
            print!("{}", render::render_struct(&decoded));
            for file in files {
                println!("  📁 {file}");
            }
            Ok(())
        }
    }
}

fn run_classify(order: Vec<u32>, output: OutputFormat) -> Result<(), AppError> {
    let captured = order
        .into_iter()
        .map(|id| CapturedFormat::new(id, None, None))
        .collect();
    let snapshot = ClipboardSnapshot::from_captured(captured);

    match output {
        OutputFormat::Json => print_json(&snapshot),
        OutputFormat::Text => {
            for entry in snapshot.entries() {
                let badge = if entry.assumed_synthesized() { "合成" } else { "原始" };
                println!("{:>6}  {:<24} {}", entry.id(), entry.name(), badge);
            }
            Ok(())
        }
    }
}

fn run_describe(name: &str, output: OutputFormat) -> Result<(), AppError> {
    let doc = docs::lookup(name)
        .ok_or_else(|| AppError::InvalidArgument(format!("没有找到 {name} 的文档")))?;
    let descriptor = Catalog::builtin().get(&name.to_ascii_uppercase());
    let display = docs::parse_format_id(name)
        .map(|id| format_display_name(id, None))
        .unwrap_or_else(|| name.to_string());

    match output {
        OutputFormat::Json => print_json(&doc),
        OutputFormat::Text => {
            println!("{display}");
            println!("  {}", doc.description);
            println!("  {}", doc.url);
            if let Some(descriptor) = descriptor {
                for info in enumerate_fields(descriptor) {
                    let marker = if info.skip { "（不处理）" } else { "" };
                    println!("    {:<20} {}{}", info.name, info.ty, marker);
                }
            }
            Ok(())
        }
    }
}

fn run_list(builder: &ObjectBuilder<'_>, output: OutputFormat) -> Result<(), AppError> {
    let catalog = builder.catalog();
    let width = builder.options().pointer_width;
    let rows: Vec<(&str, Option<usize>)> = catalog
        .names()
        .into_iter()
        .filter_map(|name| catalog.get(name).map(|d| (name, catalog.fixed_size(d, width))))
        .collect();

    match output {
        OutputFormat::Json => print_json(&rows),
        OutputFormat::Text => {
            for (name, size) in rows {
                let size = size.map_or("变长".to_string(), |s| format!("{s} 字节"));
                println!("{name:<24} {size}");
            }
            Ok(())
        }
    }
}
