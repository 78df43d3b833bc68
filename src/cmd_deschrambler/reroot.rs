use clap::*;
use deschrambler::libs::phylo::Tree;
use log::debug;
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("reroot")
        .about("Show the tree as rerooted above the designated ancestor")
        .after_help(
            r###"
Prints the tree that `infer` works on.

Notes:
* The node marked with `@` is moved directly under a new root, NEWROOT, with a
  zero-length branch. The rest of the tree hangs from NEWROOT on the other side,
  with the branches on the path to the old root reversed.
* NEWROOT becomes the designated ancestor and is printed with `@`.
* Leaves outside the ancestor's original subtree carry `[&&NHX:outgroup=1]`.
* A tree without `@`, or with `@` on the root, keeps its shape; its root is
  printed with `@`.
* Unnamed nodes are labeled IN1, IN2, ...
* `--alpha` multiplies branch lengths first.

Examples:
1. deschrambler reroot tree.txt

2. echo "((A:1,B:1)@X:2,C:3);" | deschrambler reroot stdin
   ((A:1,B:1)X:0,(C:3[&&NHX:outgroup=1])IN1:2)@NEWROOT;

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .num_args(1)
                .index(1)
                .help("Input filename. [stdin] for standard input"),
        )
        .arg(
            Arg::new("alpha")
                .long("alpha")
                .num_args(1)
                .value_parser(value_parser!(f64))
                .help("Branch length multiplier"),
        )
        .arg(
            Arg::new("outfile")
                .short('o')
                .long("outfile")
                .num_args(1)
                .default_value("stdout")
                .help("Output filename. [stdout] for screen"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let outfile = args.get_one::<String>("outfile").unwrap();
    let mut tree = Tree::from_file(args.get_one::<String>("infile").unwrap())?;

    //----------------------------
    // Ops
    //----------------------------
    if let Some(&alpha) = args.get_one::<f64>("alpha") {
        if !alpha.is_finite() || alpha < 0.0 {
            anyhow::bail!("alpha must be a non-negative number, got {}", alpha);
        }
        for id in 0..tree.len() {
            if let Some(node) = tree.get_node_mut(id) {
                node.length = node.length.map(|l| l * alpha);
            }
        }
    }
    tree.classify_outgroups()?;
    let root = tree.reroot_at_ancestor()?;
    debug!("New root: {}", tree[root].name_or_id());

    //----------------------------
    // Output
    //----------------------------
    let mut writer = deschrambler::writer(outfile)?;
    writer.write_fmt(format_args!("{}\n", tree.to_newick()))?;
    writer.flush()?;

    Ok(())
}
