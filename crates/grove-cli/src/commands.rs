use std::collections::BTreeMap;

use colored::Colorize;

use grove_container::{MemoryContainer, MemoryDataset, MemoryNode};
use grove_format::ContainerWriter;
use grove_store::{HierarchicalStore, Node, TypedArray};
use grove_types::ElementKind;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Ls(args) => cmd_ls(args, &cli.format),
        Command::Show(args) => cmd_show(args, &cli.format),
        Command::Check(args) => cmd_check(args),
        Command::Sample(args) => cmd_sample(args),
    }
}

fn cmd_ls(args: LsArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let store = HierarchicalStore::open(&args.file)?;
    match format {
        OutputFormat::Text => print_tree(store.root(), 0),
        OutputFormat::Json => {
            let value = tree_to_json(store.root());
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}

fn print_tree(children: &BTreeMap<String, Node>, indent: usize) {
    let pad = "  ".repeat(indent);
    for (name, node) in children {
        match node {
            Node::Group(sub) => {
                println!("{pad}{}/", name.blue().bold());
                print_tree(sub, indent + 1);
            }
            Node::Dataset(array) => {
                println!("{pad}{}  {}", name, array.describe().dimmed());
            }
        }
    }
}

fn tree_to_json(children: &BTreeMap<String, Node>) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for (name, node) in children {
        let value = match node {
            Node::Group(sub) => tree_to_json(sub),
            Node::Dataset(array) => serde_json::json!({
                "rank": array.rank(),
                "type": array.element_kind().type_name(),
                "extents": array.extents(),
            }),
        };
        map.insert(name.clone(), value);
    }
    serde_json::Value::Object(map)
}

fn cmd_show(args: ShowArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let store = HierarchicalStore::open(&args.file)?;
    let segments: Vec<&str> = args.path.split('/').filter(|s| !s.is_empty()).collect();
    let array = store.dataset(&segments)?;
    match format {
        OutputFormat::Text => {
            println!("{}  {}", args.path.yellow().bold(), array.describe());
            println!("{}", format_values(array));
        }
        OutputFormat::Json => {
            let values = match array.element_kind() {
                ElementKind::Int32 => serde_json::json!(array.to_i32()),
                ElementKind::Float64 => serde_json::json!(array.to_f64()),
            };
            let value = serde_json::json!({
                "path": args.path,
                "rank": array.rank(),
                "type": array.element_kind().type_name(),
                "extents": array.extents(),
                "values": values,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}

fn format_values(array: &TypedArray) -> String {
    match array.element_kind() {
        ElementKind::Int32 => array
            .to_i32()
            .unwrap_or_default()
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" "),
        ElementKind::Float64 => array
            .to_f64()
            .unwrap_or_default()
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" "),
    }
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    match HierarchicalStore::open(&args.file) {
        Ok(store) => {
            println!(
                "{} {}: {} datasets loaded",
                "✓".green().bold(),
                args.file.display(),
                store.dataset_count().to_string().bold()
            );
            Ok(())
        }
        Err(err) => {
            println!("{} {}: {}", "✗".red().bold(), args.file.display(), err);
            Err(err.into())
        }
    }
}

fn cmd_sample(args: SampleArgs) -> anyhow::Result<()> {
    let mut container = MemoryContainer::new();
    container.insert(
        &["a"],
        MemoryNode::Dataset(MemoryDataset::float64(vec![3], &[1.0, 2.0, 3.0])),
    )?;
    container.insert(
        &["g", "b"],
        MemoryNode::Dataset(MemoryDataset::int32(vec![2, 2], &[1, 2, 3, 4])),
    )?;
    container.insert(
        &["g", "scalar"],
        MemoryNode::Dataset(MemoryDataset::float64(vec![], &[42.5])),
    )?;
    container.insert(&["readme"], MemoryNode::Opaque(b"grove sample".to_vec()))?;

    ContainerWriter::write_to(&args.out, &container)?;
    println!(
        "{} wrote sample container to {}",
        "✓".green().bold(),
        args.out.display().to_string().bold()
    );
    Ok(())
}
