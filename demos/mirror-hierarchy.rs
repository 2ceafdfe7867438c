use std::error::Error;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::PathBuf;

use clap::Parser;
use indextree::NodeId;
use tracing::info;
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*};

use joint_hierarchy::formats::file::{read_hierarchy, write_hierarchy};
use joint_hierarchy::formats::KeyStyle;
use joint_hierarchy::scene::memory::MemoryScene;
use joint_hierarchy::{BuildOptions, HierarchyBuilder, HierarchyNode, HierarchyReader};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
	#[arg(help = "Path to the hierarchy .json file")]
	json_path: PathBuf,

	#[arg(short, long, default_value = "_pasted", help = "Suffix for the rebuilt node names")]
	suffix: String,

	#[arg(short, long, help = "Mirror the rebuilt hierarchy across X")]
	mirror: bool,

	#[arg(short, long, help = "JSON build options, overrides --suffix and --mirror")]
	config: Option<PathBuf>,

	#[arg(long, help = "Write with the numbered 1_name/2_pos/... keys")]
	legacy_keys: bool,

	#[arg(short, long, help = "Output file, stdout if not given")]
	output: Option<PathBuf>,
}

/// Recreates a loaded hierarchy as scene nodes, standing in for the host scene it came from.
fn load_into_scene(scene: &mut MemoryScene, node: &HierarchyNode, parent: Option<NodeId>) -> NodeId {
	let id = scene.add_transform(&node.name, parent, node.position, node.rotation);
	for child in &node.children {
		load_into_scene(scene, child, Some(id));
	}
	id
}

fn main() -> Result<(), Box<dyn Error>> {
	let cli = Cli::parse();

	tracing_subscriber::registry()
		.with(fmt::layer().with_writer(io::stderr))
		.with(LevelFilter::INFO)
		.init();

	let options = match &cli.config {
		Some(path) => BuildOptions::from_json(&json::parse(&fs::read_to_string(path)?)?)?,
		None => BuildOptions::new(cli.suffix.clone(), cli.mirror),
	};
	info!("Rebuilding with {options:?}");

	let source = read_hierarchy(BufReader::new(File::open(&cli.json_path)?))?;
	let mut scene = MemoryScene::new();
	let source_root = load_into_scene(&mut scene, &source, None);
	scene.select(Some(source_root));

	let reader = HierarchyReader::new(&scene);
	let captured = reader.capture_selection(&scene)?;
	let copy_root = HierarchyBuilder::new(options).reconstruct(&mut scene, &captured)?;
	let copy = HierarchyReader::new(&scene).capture(Some(&copy_root))?;
	info!("Scene now holds {} transforms", scene.transform_count());

	let style = match cli.legacy_keys {
		true => KeyStyle::Legacy,
		false => KeyStyle::Plain,
	};
	match &cli.output {
		Some(path) => write_hierarchy(&copy, File::create(path)?, style)?,
		None => write_hierarchy(&copy, io::stdout().lock(), style)?,
	}

	Ok(())
}
