use clap::*;
use deschrambler::libs::apcf::{Assembler, ScoreTable};
use log::info;
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("assemble")
        .about("Chain scored adjacencies into ancestral fragments (APCFs)")
        .after_help(
            r###"
Greedily chains oriented blocks into ancestral contiguous fragments.

Adjacencies are taken from the heaviest down. One is kept when both block
extremities it joins are still free and it does not close a fragment into a
circle. Equal weights are taken in order of (block, strand) of their two ends.

Input:
* <scores>: `block1 block2 score` per line, signed IDs giving the strand; `0`
  is a chromosome end. A score for `a b` also holds for `-b -a`. Lines starting
  with `#` are skipped, so the output of `infer` can be used directly.

Output:
* <apcf-out>:
      >ANCESTOR<TAB>n_blocks
      # APCF 1
      1 -3 2 $
      # APCF 2
      4 5 $
* <joins-out>: `block1<TAB>block2<TAB>weight` for every adjacency kept, fragment
  by fragment.

Examples:
1. Keep every positive score:
   deschrambler assemble 0 adjacencies.prob apcf.txt joins.txt

2. Only adjacencies with a posterior of at least 0.5:
   deschrambler assemble 0.5 adjacencies.prob apcf.txt joins.txt

"###,
        )
        .arg(
            Arg::new("min_weight")
                .required(true)
                .index(1)
                .allow_negative_numbers(true)
                .value_parser(value_parser!(f64))
                .help("Minimum weight of a kept adjacency"),
        )
        .arg(
            Arg::new("scores")
                .required(true)
                .index(2)
                .help("Score file. [stdin] for standard input"),
        )
        .arg(
            Arg::new("apcf")
                .required(true)
                .index(3)
                .help("Output file of fragments. [stdout] for screen"),
        )
        .arg(
            Arg::new("joins")
                .required(true)
                .index(4)
                .help("Output file of kept adjacencies"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let min_weight = *args.get_one::<f64>("min_weight").unwrap();
    let infile = args.get_one::<String>("scores").unwrap();
    let apcf_file = args.get_one::<String>("apcf").unwrap();
    let joins_file = args.get_one::<String>("joins").unwrap();

    info!("Minimum weight = {}", min_weight);
    info!("Score file = {}", infile);

    //----------------------------
    // Ops
    //----------------------------
    let table = ScoreTable::read(deschrambler::reader(infile)?)?;
    let assembly = Assembler::run(&table, min_weight);
    info!(
        "{} APCFs from {} adjacencies over {} blocks",
        assembly.paths.len(),
        assembly.edge_count(),
        assembly.n_blocks
    );

    //----------------------------
    // Output
    //----------------------------
    let mut writer = deschrambler::writer(apcf_file)?;
    assembly.write_apcf(&mut writer)?;
    writer.flush()?;

    let mut writer = deschrambler::writer(joins_file)?;
    assembly.write_joins(&mut writer)?;
    writer.flush()?;

    Ok(())
}
