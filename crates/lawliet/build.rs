use std::path::Path;

use clap::CommandFactory;

#[allow(dead_code)]
#[path = "src/cli.rs"]
mod cli;

fn main() {
    println!("cargo:rerun-if-changed=src/cli.rs");

    let out_dir = std::env::var("OUT_DIR").expect("OUT_DIR is set by cargo");
    let man_dir = Path::new(&out_dir).join("man");
    std::fs::create_dir_all(&man_dir).expect("create man dir");

    let cmd = cli::Cli::command();
    generate_manpages(&cmd, &man_dir, "lawliet");
}

/// Render one page per (sub)command, named like `lawliet-images-upload.1`.
fn generate_manpages(cmd: &clap::Command, dir: &Path, name: &str) {
    let page = clap_mangen::Man::new(cmd.clone().name(name.to_owned()));
    let mut buf = Vec::new();
    page.render(&mut buf).expect("render man page");
    std::fs::write(dir.join(format!("{name}.1")), buf).expect("write man page");

    for sub in cmd.get_subcommands().filter(|s| !s.is_hide_set()) {
        let sub_name = format!("{name}-{}", sub.get_name());
        generate_manpages(sub, dir, &sub_name);
    }
}
