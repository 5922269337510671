use clap::Parser;
use mirror_rs::{
    types::members::{MemberDescription, MemberInfo},
    MemberCatalog, TypeRegistry,
};
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Dump the members of a built-in type as the fuzzy resolvers see them"
)]
struct Args {
    /// The full name of the type to dump (e.g. core.List)
    type_name: String,
    /// Only list members declared by the type itself
    #[arg(long)]
    declared_only: bool,
}

fn main() -> ExitCode {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let registry = match TypeRegistry::core() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let description = match registry.get_class(&args.type_name) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("{}", e);
            println!("\nAvailable types:");
            for t in registry.types() {
                println!("  {}", t.type_name());
            }
            return ExitCode::FAILURE;
        }
    };

    let definition = description.definition();
    println!("{:?} {}", definition.kind, description.runtime_type());
    if let Some(parent) = &definition.extends {
        println!("  extends {}", parent);
    }
    for interface in &definition.implements {
        println!("  implements {}", interface);
    }

    let catalog = MemberCatalog::new(description);
    let members = if args.declared_only {
        catalog.declared()
    } else {
        catalog.members()
    };

    println!("\nFields:");
    for member in &members {
        if let MemberDescription::FieldDescription(f) = member {
            println!("  - {:?} {:?} (slot {})", f.accessibility(), f, f.field.slot());
        }
    }

    println!("\nMethods:");
    for member in &members {
        if let MemberDescription::MethodDescription(m) = member {
            let body = match m.method.body {
                Some(_) => "native",
                None => "abstract",
            };
            println!("  - {:?} {:?} [{}]", m.accessibility(), m, body);
        }
    }

    ExitCode::SUCCESS
}
