use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use clap::Parser;
use joint_hierarchy::formats::file::read_hierarchy;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
	#[arg(help = "Path to the hierarchy .json file")]
	json_path: PathBuf,
}

fn main() {
	let cli = Cli::parse();

	let file = File::open(cli.json_path).unwrap();
	let tree = read_hierarchy(BufReader::new(file)).unwrap();

	println!("== Hierarchy ({} nodes) ==\n{}", tree.count_nodes(), tree);
}
