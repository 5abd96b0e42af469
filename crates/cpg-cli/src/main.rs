//! CLI binary for the course planner: edit a catalog, order it, plan terms, export it.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cpg_core::catalog::Catalog;
use cpg_core::config::CpgConfig;
use cpg_core::planner::{PlanOptions, plan_terms_detailed};
use cpg_core::storage;
use cpg_core::topo::topo_order;
use cpg_nav::export::{ExportFormat, GraphPayload, RankDir};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "course-planner", about = "Course prerequisite graph and term planner")]
struct Cli {
    /// Project root directory (defaults to current directory)
    #[arg(short, long, global = true)]
    project: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty catalog in .cpg/catalog.json
    Init {
        /// Start from a small example catalog (CS101 -> CS201)
        #[arg(long)]
        seed: bool,

        /// Overwrite an existing catalog
        #[arg(long)]
        force: bool,
    },

    /// Add a course, or update the course with the same code
    AddCourse {
        /// Course code (normalized to upper case)
        code: String,

        /// Descriptive title
        #[arg(short, long, default_value = "")]
        title: String,

        /// Credit hours
        #[arg(short, long, default_value = "0")]
        credits: u32,
    },

    /// Remove a course and every prerequisite touching it
    RemoveCourse {
        /// Course id or code
        course: String,
    },

    /// Record that FROM must be completed before TO
    AddPrereq {
        /// Prerequisite course id or code
        from: String,
        /// Dependent course id or code
        to: String,
    },

    /// Remove a prerequisite record by id
    RemovePrereq {
        /// Prerequisite record id
        id: String,
    },

    /// List courses and prerequisites
    List,

    /// Print every course in dependency order
    Order,

    /// Group courses into terms
    Plan {
        /// Maximum courses per term (defaults to [planning] max_per_term)
        #[arg(short, long)]
        max_per_term: Option<usize>,

        /// Only plan these courses, by id or code (repeatable)
        #[arg(long)]
        target: Vec<String>,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export graph as DOT (Graphviz), Mermaid flowchart, or JSON
    Export {
        /// Output format: dot, mermaid, json (defaults to [export] format)
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Replace the catalog with a JSON graph payload ({nodes: [{id, label}], edges: [{from, to}]})
    Import {
        /// Payload file
        file: PathBuf,

        /// Overwrite an existing catalog
        #[arg(long)]
        force: bool,
    },

    /// Check catalog integrity (dangling, self, duplicate prerequisites; cycles)
    Validate,

    /// Show catalog statistics
    Info,
}

fn get_project_root(cli: &Cli) -> Result<PathBuf> {
    match &cli.project {
        Some(p) => Ok(p.clone()),
        None => std::env::current_dir().context("failed to get current directory"),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let project_root = get_project_root(&cli)?;

    match cli.command {
        Commands::Init { seed, force } => cmd_init(&project_root, seed, force),
        Commands::AddCourse {
            code,
            title,
            credits,
        } => cmd_add_course(&project_root, &code, &title, credits),
        Commands::RemoveCourse { course } => cmd_remove_course(&project_root, &course),
        Commands::AddPrereq { from, to } => cmd_add_prereq(&project_root, &from, &to),
        Commands::RemovePrereq { id } => cmd_remove_prereq(&project_root, &id),
        Commands::List => cmd_list(&project_root),
        Commands::Order => cmd_order(&project_root),
        Commands::Plan {
            max_per_term,
            target,
            json,
        } => cmd_plan(&project_root, max_per_term, &target, json),
        Commands::Export { format } => cmd_export(&project_root, format.as_deref()),
        Commands::Import { file, force } => cmd_import(&project_root, &file, force),
        Commands::Validate => cmd_validate(&project_root),
        Commands::Info => cmd_info(&project_root),
    }
}

fn load_catalog(project_root: &Path) -> Result<Catalog> {
    if !storage::catalog_exists(project_root) {
        anyhow::bail!("No catalog found. Run `course-planner init` first.");
    }
    storage::load(project_root)
}

fn resolve_id(catalog: &Catalog, id_or_code: &str) -> Result<String> {
    catalog
        .resolve(id_or_code)
        .map(|c| c.id.clone())
        .ok_or_else(|| anyhow::anyhow!("unknown course: {}", id_or_code))
}

fn label_of(catalog: &Catalog, id: &str) -> String {
    catalog
        .course(id)
        .map_or_else(|| id.to_string(), |c| c.to_node().label())
}

fn cmd_init(project_root: &Path, seed: bool, force: bool) -> Result<()> {
    if storage::catalog_exists(project_root) && !force {
        anyhow::bail!(".cpg/catalog.json already exists. Use --force to overwrite.");
    }
    let catalog = if seed {
        Catalog::seeded()
    } else {
        Catalog::new()
    };
    storage::save(project_root, &catalog)?;
    eprintln!(
        "Catalog created with {} course(s) at .cpg/catalog.json",
        catalog.courses.len()
    );
    Ok(())
}

fn cmd_add_course(project_root: &Path, code: &str, title: &str, credits: u32) -> Result<()> {
    let mut catalog = load_catalog(project_root)?;
    let course = catalog
        .upsert_course(code, title, credits)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("course code must not be blank"))?;
    storage::save(project_root, &catalog)?;
    println!("{}  {}", course.id, course.to_node().label());
    Ok(())
}

fn cmd_remove_course(project_root: &Path, course: &str) -> Result<()> {
    let mut catalog = load_catalog(project_root)?;
    let id = resolve_id(&catalog, course)?;
    let before = catalog.prereqs.len();
    if let Some(removed) = catalog.remove_course(&id) {
        storage::save(project_root, &catalog)?;
        eprintln!(
            "Removed {} and {} prerequisite(s).",
            removed.code,
            before - catalog.prereqs.len()
        );
    }
    Ok(())
}

fn cmd_add_prereq(project_root: &Path, from: &str, to: &str) -> Result<()> {
    let mut catalog = load_catalog(project_root)?;
    let from = resolve_id(&catalog, from)?;
    let to = resolve_id(&catalog, to)?;

    let added = catalog.add_prereq(&from, &to).cloned();
    match added {
        Some(prereq) => {
            storage::save(project_root, &catalog)?;
            println!(
                "{}  {} -> {}",
                prereq.id,
                label_of(&catalog, &from),
                label_of(&catalog, &to)
            );
            if let Err(err) = topo_order(&catalog.graph()) {
                tracing::warn!("{}", err);
            }
        }
        None => eprintln!("Ignored: self-reference or existing prerequisite."),
    }
    Ok(())
}

fn cmd_remove_prereq(project_root: &Path, id: &str) -> Result<()> {
    let mut catalog = load_catalog(project_root)?;
    if catalog.remove_prereq(id).is_none() {
        anyhow::bail!("unknown prerequisite: {}", id);
    }
    storage::save(project_root, &catalog)?;
    eprintln!("Removed prerequisite {}.", id);
    Ok(())
}

fn cmd_list(project_root: &Path) -> Result<()> {
    let catalog = load_catalog(project_root)?;
    let mut courses: Vec<_> = catalog.courses.iter().collect();
    courses.sort_by(|a, b| a.code.cmp(&b.code));

    println!("Courses ({}):", courses.len());
    for course in courses {
        println!(
            "  {:<6} {}  [{} cr]",
            course.id,
            course.to_node().label(),
            course.credits
        );
    }
    println!("\nPrerequisites ({}):", catalog.prereqs.len());
    for prereq in &catalog.prereqs {
        println!(
            "  {:<6} {} -> {}",
            prereq.id,
            label_of(&catalog, &prereq.from),
            label_of(&catalog, &prereq.to)
        );
    }
    Ok(())
}

fn cmd_order(project_root: &Path) -> Result<()> {
    let catalog = load_catalog(project_root)?;
    let order = topo_order(&catalog.graph()).map_err(|err| {
        let stuck: Vec<String> = err.stuck.iter().map(|id| label_of(&catalog, id)).collect();
        anyhow::anyhow!("prerequisite cycle among: {}", stuck.join(", "))
    })?;
    for (i, id) in order.iter().enumerate() {
        println!("{}. {}", i + 1, label_of(&catalog, id));
    }
    Ok(())
}

fn cmd_plan(
    project_root: &Path,
    max_per_term: Option<usize>,
    targets: &[String],
    json: bool,
) -> Result<()> {
    let catalog = load_catalog(project_root)?;
    let config = CpgConfig::load(project_root)?;

    let mut options: PlanOptions = config.planning.plan_options();
    if let Some(max) = max_per_term {
        options.max_per_term = max;
    }
    if !targets.is_empty() {
        // Unknown targets stay as given; the planner reports them as unscheduled.
        let ids: Vec<String> = targets
            .iter()
            .map(|t| catalog.resolve(t).map_or_else(|| t.clone(), |c| c.id.clone()))
            .collect();
        options = options.with_targets(ids);
    }

    let plan = plan_terms_detailed(&catalog.graph(), &options).map_err(|err| {
        let stuck: Vec<String> = err.stuck.iter().map(|id| label_of(&catalog, id)).collect();
        anyhow::anyhow!(
            "cannot plan: prerequisite cycle among: {}",
            stuck.join(", ")
        )
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    for (i, term) in plan.terms.iter().enumerate() {
        println!(
            "Term {} ({} credits)",
            i + 1,
            catalog.total_credits(term)
        );
        for id in term {
            println!("  - {}", label_of(&catalog, id));
        }
    }
    if plan.terms.is_empty() {
        println!("No courses to plan.");
    }
    if !plan.is_complete() {
        let missing: Vec<String> = plan
            .unscheduled
            .iter()
            .map(|id| label_of(&catalog, id))
            .collect();
        eprintln!(
            "\nIncomplete plan: {}/{} scheduled. Never eligible: {}",
            plan.scheduled_count(),
            plan.scheduled_count() + plan.unscheduled.len(),
            missing.join(", ")
        );
    }
    Ok(())
}

fn cmd_export(project_root: &Path, format: Option<&str>) -> Result<()> {
    let catalog = load_catalog(project_root)?;
    let config = CpgConfig::load(project_root)?;

    let format = format.unwrap_or(&config.export.format);
    let export_format = ExportFormat::from_name(format).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown export format: {}. Use 'dot', 'mermaid' or 'json'.",
            format
        )
    })?;
    let rankdir = RankDir::from_name(&config.export.direction).unwrap_or_default();

    let output = cpg_nav::export::export(&catalog.graph(), export_format, rankdir)?;
    print!("{}", output);
    if !output.ends_with('\n') {
        println!();
    }
    Ok(())
}

/// Build a fresh catalog from a graph payload. Returns the catalog and the
/// number of payload edges that referenced unknown courses.
fn catalog_from_payload(payload: &GraphPayload) -> (Catalog, usize) {
    let mut catalog = Catalog::new();
    let mut ids: HashMap<String, String> = HashMap::new();
    for node in payload.course_nodes() {
        let title = node.title.as_deref().unwrap_or("");
        if let Some(course) = catalog.upsert_course(&node.code, title, 0) {
            ids.insert(node.id, course.id.clone());
        }
    }

    let mut skipped = 0;
    for edge in &payload.edges {
        match (ids.get(&edge.from), ids.get(&edge.to)) {
            (Some(from), Some(to)) => {
                catalog.add_prereq(from, to);
            }
            _ => skipped += 1,
        }
    }
    (catalog, skipped)
}

fn cmd_import(project_root: &Path, file: &Path, force: bool) -> Result<()> {
    if storage::catalog_exists(project_root) && !force {
        anyhow::bail!(".cpg/catalog.json already exists. Use --force to overwrite.");
    }
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let payload: GraphPayload = serde_json::from_str(&json)
        .with_context(|| format!("failed to parse graph payload in {}", file.display()))?;

    let (catalog, skipped) = catalog_from_payload(&payload);
    storage::save(project_root, &catalog)?;
    eprintln!(
        "Imported {} course(s) and {} prerequisite(s).",
        catalog.courses.len(),
        catalog.prereqs.len()
    );
    if skipped > 0 {
        tracing::warn!(skipped, "skipped edges referencing unknown courses");
    }
    Ok(())
}

fn cmd_validate(project_root: &Path) -> Result<()> {
    let catalog = load_catalog(project_root)?;
    let report = cpg_nav::health::check_catalog(&catalog);

    for prereq in &report.dangling {
        println!(
            "WARN: dangling prerequisite {}: {} -> {}",
            prereq.id, prereq.from, prereq.to
        );
    }
    for prereq in &report.self_edges {
        println!("WARN: self prerequisite {}: {}", prereq.id, prereq.from);
    }
    for prereq in &report.duplicates {
        println!(
            "WARN: duplicate prerequisite {}: {} -> {}",
            prereq.id, prereq.from, prereq.to
        );
    }
    for code in &report.duplicate_codes {
        println!("WARN: course code used more than once: {}", code);
    }
    for id in &report.duplicate_ids {
        println!("ERROR: record id used more than once: {}", id);
    }
    if let Some(stuck) = &report.cycle {
        let labels: Vec<String> = stuck.iter().map(|id| label_of(&catalog, id)).collect();
        println!("ERROR: prerequisite cycle among: {}", labels.join(", "));
    }

    if report.is_healthy() {
        eprintln!("Catalog is valid. No integrity issues found.");
        eprintln!(
            "  {} courses, {} prerequisites",
            catalog.courses.len(),
            catalog.prereqs.len()
        );
    } else {
        eprintln!("\nFound {} integrity issue(s).", report.issue_count());
    }
    Ok(())
}

fn cmd_info(project_root: &Path) -> Result<()> {
    if !storage::catalog_exists(project_root) {
        eprintln!("No catalog found. Run `course-planner init` first.");
        return Ok(());
    }

    let catalog = storage::load(project_root)?;
    let graph = catalog.graph();
    let config = CpgConfig::load(project_root)?;

    println!("Catalog v{}", catalog.version);
    println!("Created: {}", catalog.created_at);
    println!("Updated: {}", catalog.updated_at);
    println!();
    println!("Courses: {}", catalog.courses.len());
    println!(
        "Total credits: {}",
        catalog.courses.iter().map(|c| c.credits).sum::<u32>()
    );
    println!("Prerequisite records: {}", catalog.prereqs.len());
    println!("Graph edges: {}", graph.edge_count());
    println!(
        "Entry-level courses: {}",
        graph.ids().filter(|id| graph.in_degree(id) == 0).count()
    );
    match topo_order(&graph) {
        Ok(_) => println!("Acyclic: yes"),
        Err(err) => println!("Acyclic: no ({} courses stuck)", err.stuck.len()),
    }
    println!("Max per term: {}", config.planning.max_per_term);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cpg_core::graph::Edge;
    use cpg_nav::export::PayloadNode;

    #[test]
    fn test_catalog_from_payload_maps_ids() {
        let payload = GraphPayload {
            nodes: vec![
                PayloadNode {
                    id: "17".to_string(),
                    label: "CS101 — Intro".to_string(),
                },
                PayloadNode {
                    id: "42".to_string(),
                    label: "CS201".to_string(),
                },
            ],
            edges: vec![Edge::new("17", "42"), Edge::new("17", "99")],
        };

        let (catalog, skipped) = catalog_from_payload(&payload);
        assert_eq!(skipped, 1);
        assert_eq!(catalog.courses.len(), 2);
        let intro = catalog.find_by_code("CS101").unwrap();
        let ds = catalog.find_by_code("CS201").unwrap();
        assert_eq!(intro.title.as_deref(), Some("Intro"));
        assert_eq!(catalog.prereqs.len(), 1);
        assert_eq!(catalog.prereqs[0].from, intro.id);
        assert_eq!(catalog.prereqs[0].to, ds.id);
    }

    #[test]
    fn test_resolve_id_errors_on_unknown() {
        let catalog = Catalog::seeded();
        assert!(resolve_id(&catalog, "cs101").is_ok());
        assert!(resolve_id(&catalog, "nope").is_err());
    }
}
