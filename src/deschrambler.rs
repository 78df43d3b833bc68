extern crate clap;
use clap::*;

mod cmd_deschrambler;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let app = Command::new("deschrambler")
        .version(crate_version!())
        .author(crate_authors!())
        .about("`deschrambler` - Ancestral genome reconstruction from synteny blocks")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .subcommand(cmd_deschrambler::infer::make_subcommand())
        .subcommand(cmd_deschrambler::assemble::make_subcommand())
        .subcommand(cmd_deschrambler::reroot::make_subcommand())
        .after_help(
            r###"Subcommands:

* infer    - Posterior probabilities of ancestral adjacencies
* assemble - Chain scored adjacencies into ancestral fragments (APCFs)
* reroot   - Show the tree as rerooted above the designated ancestor

A typical run:

    deschrambler infer hg19 0.5 tree.txt genomes.txt -o adjacencies.prob
    deschrambler assemble 0.0 adjacencies.prob apcf.txt joins.txt

Set RUST_LOG=debug for detailed progress, RUST_LOG=warn to silence it.

"###,
        );

    // Check which subcomamnd the user ran...
    match app.get_matches().subcommand() {
        Some(("infer", sub_matches)) => cmd_deschrambler::infer::execute(sub_matches),
        Some(("assemble", sub_matches)) => cmd_deschrambler::assemble::execute(sub_matches),
        Some(("reroot", sub_matches)) => cmd_deschrambler::reroot::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}
