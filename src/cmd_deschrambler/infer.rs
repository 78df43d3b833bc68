use clap::*;
use deschrambler::libs::genome::{read_genomes, read_joins};
use deschrambler::libs::likelihood::{Context, Engine, InferOptions};
use deschrambler::libs::phylo::Tree;
use log::info;
use std::io::Write;
use std::path::PathBuf;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("infer")
        .about("Posterior probabilities of ancestral adjacencies")
        .after_help(
            r###"
Computes, for every adjacency between block ends seen in any extant genome, the
posterior probability that it was present in the designated ancestor.

Inputs:
* <tree>: a Newick tree. `@` before a node name marks the ancestor to be
  reconstructed; without it the root is used. Leaves outside the ancestor's
  subtree are outgroups. Unnamed internal nodes are labeled IN1, IN2, ...
      ((hg19:0.08,panTro2:0.08)@HP:0.3,rheMac2:0.4);
* <genomes>: per species, a `>name count` header followed by `count` chromosome
  lines of signed block IDs ending with `$`. A `# chr<label>` line may precede
  each chromosome.
      >hg19 2
      # chr1
      1 -3 2 $
      # chr2
      4 $

Notes:
* The number of blocks T is the number of blocks in the reference genome.
* Branch lengths are multiplied by <alpha>.
* With `--joins DIR`, outgroup adjacencies are read from `DIR/<name>.joins`,
  one `x y` pair per line with `0` for a chromosome end, instead of from the
  genome file.
* Output starts with `#T`, then `block1<TAB>block2<TAB>probability` per
  adjacency; `0` stands for a chromosome end. Both strands of an adjacency are
  listed.

Examples:
1. Default output file adjacencies.prob:
   deschrambler infer hg19 0.5 tree.txt genomes.txt

2. Fragmented outgroup assemblies:
   deschrambler infer hg19 0.5 tree.txt genomes.txt --joins joins/ -o stdout

"###,
        )
        .arg(
            Arg::new("refspc")
                .required(true)
                .index(1)
                .help("Reference species, whose blocks define T"),
        )
        .arg(
            Arg::new("alpha")
                .required(true)
                .index(2)
                .value_parser(value_parser!(f64))
                .help("Branch length multiplier"),
        )
        .arg(
            Arg::new("tree")
                .required(true)
                .index(3)
                .help("Tree file. [stdin] for standard input"),
        )
        .arg(
            Arg::new("genomes")
                .required(true)
                .index(4)
                .help("Genome file"),
        )
        .arg(
            Arg::new("joins")
                .long("joins")
                .num_args(1)
                .help("Directory of <name>.joins files for outgroups"),
        )
        .arg(
            Arg::new("outfile")
                .short('o')
                .long("outfile")
                .num_args(1)
                .default_value("adjacencies.prob")
                .help("Output filename. [stdout] for screen"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let opt = InferOptions {
        reference: args.get_one::<String>("refspc").unwrap().to_string(),
        alpha: *args.get_one::<f64>("alpha").unwrap(),
        use_joins: args.contains_id("joins"),
    };
    let joins_dir = args.get_one::<String>("joins").map(PathBuf::from);
    let outfile = args.get_one::<String>("outfile").unwrap();

    info!("Reference species: {}", opt.reference);
    info!("alpha = {}", opt.alpha);

    //----------------------------
    // Ops
    //----------------------------
    let tree = Tree::from_file(args.get_one::<String>("tree").unwrap())?;
    let genomes = read_genomes(deschrambler::reader(
        args.get_one::<String>("genomes").unwrap(),
    )?)?;

    let ctx = Context::new(tree, &genomes, &opt, |name: &str| {
        let dir = joins_dir
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("no joins directory for {}", name))?;
        let path = dir.join(format!("{}.joins", name));
        info!("Reading joins of {} from {}", name, path.display());
        let reader = deschrambler::reader(&path.to_string_lossy())?;
        Ok(read_joins(reader)?)
    })?;
    info!("T = {}", ctx.space().blocks());

    info!("Computing posterior probabilities");
    let posteriors = Engine::new(&ctx)?.run()?;

    //----------------------------
    // Output
    //----------------------------
    let mut writer = deschrambler::writer(outfile)?;
    posteriors.write(&mut writer)?;
    writer.flush()?;
    info!(
        "{} adjacencies written to {}",
        posteriors.adjacencies().len(),
        outfile
    );

    Ok(())
}
