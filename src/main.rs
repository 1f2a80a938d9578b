//! Buildroller - Entry Point
//!
//! Loads the saved session and runs a line-oriented shell over stdin. Every
//! command maps onto one `AppState` operation.

use std::fs::OpenOptions;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;

use buildroller::catalog::ClassExclusion;
use buildroller::save::FileStore;
use buildroller::{AppState, CatalogDefaults, Phase, SharePreview, SkillRecord};

/// Overrides the storage directory
const DATA_DIR_ENV: &str = "BUILDROLLER_DATA_DIR";
/// Overrides the base of generated share links
const BASE_URL_ENV: &str = "BUILDROLLER_BASE_URL";
const DEFAULT_BASE_URL: &str = "http://localhost:5173/";

const HELP: &str = "\
Drafting
  roll                      roll candidates (unlock mode rolls skills only)
  pick class|skill <n>      select a candidate, again to deselect
  finalize                  commit the selection
  new                       start a new build (clears build and checklist)
Build
  status                    show the active build
  rename <name>             rename the build (empty clears it)
  play <skill>              make an unlocked skill the active one
  link add <url> [name]     attach a link      link rm <id> | link mv <from> <to>
Checklist
  tasks                     list tasks         task toggle|rm <id>
  task add <text>           add a task         task mv <from> <to> | task reset
Catalog
  skills [query]            list skills by tag classes [query]
  skill add <name>|<tag>|[url]                 skill rm <name> | skill hide <name>
  tag exclude|collapse|rm <tag>                class exclude|collapse|rm <class>
  asc exclude|rm <ascendancy>                  reset
Settings
  set classes|skills <n>    candidate counts   set ascendancy|unlock on|off
  set delay <ms>            roll delay         filter <tag> | filter all | filter none
  pool                      show the current pools
Sharing
  share [base-url]          print a share link preview <link-or-token>
  quit";

fn main() -> Result<()> {
    // Log to file so log lines stay out of the shell
    let logger = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    init_logging(logger);

    log::info!("Starting Buildroller v{}", env!("CARGO_PKG_VERSION"));

    let store = match std::env::var_os(DATA_DIR_ENV) {
        Some(dir) => FileStore::new(PathBuf::from(dir)),
        None => FileStore::open_default(),
    };
    log::info!("Data directory: {}", store.dir().display());

    let defaults = CatalogDefaults::new();
    let mut app = AppState::load(defaults, Box::new(store));

    let result = run_shell(&mut app);
    if let Err(ref e) = result {
        log::error!("Shell exited with error: {}", e);
    }

    log::info!("Buildroller shut down cleanly");
    result
}

fn init_logging(mut builder: env_logger::Builder) {
    match OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("buildroller.log")
    {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        Err(_) => {
            builder.target(env_logger::Target::Stderr);
        }
    }
    builder.init();
}

enum Flow {
    Continue,
    Quit,
}

fn run_shell(app: &mut AppState) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut out = io::stdout();

    writeln!(out, "Buildroller. Type `help` for commands.")?;
    print_status(app, &mut out)?;

    loop {
        write!(out, "> ")?;
        out.flush()?;
        let Some(line) = lines.next() else { break };
        let line = line?;
        match run_command(app, line.trim(), &mut lines, &mut out)? {
            Flow::Continue => {}
            Flow::Quit => break,
        }
    }
    Ok(())
}

/// Ask for a y/N confirmation on the next input line
fn confirm(
    prompt: &str,
    lines: &mut impl Iterator<Item = io::Result<String>>,
    out: &mut impl Write,
) -> Result<bool> {
    write!(out, "{} [y/N] ", prompt)?;
    out.flush()?;
    let answer = lines.next().transpose()?.unwrap_or_default();
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn run_command(
    app: &mut AppState,
    line: &str,
    lines: &mut impl Iterator<Item = io::Result<String>>,
    out: &mut impl Write,
) -> Result<Flow> {
    let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    match cmd {
        "" => {}
        "help" => writeln!(out, "{}", HELP)?,
        "quit" | "exit" => return Ok(Flow::Quit),
        "status" => print_status(app, out)?,

        "roll" => match app.begin_roll(Instant::now()) {
            Ok(()) => {
                writeln!(out, "Rolling...")?;
                while let Some(remaining) = app.roll_remaining(Instant::now()) {
                    thread::sleep(remaining);
                    app.update(Instant::now());
                }
                print_draft(app, out)?;
            }
            Err(e) => writeln!(out, "{}", e)?,
        },
        "pick" => {
            let (kind, index) = rest.split_once(' ').unwrap_or((rest, ""));
            let Some(index) = parse_position(index) else {
                writeln!(out, "Usage: pick class|skill <n>")?;
                return Ok(Flow::Continue);
            };
            let result = match kind {
                "class" => app.select_class(index).map(|c| c.map(|c| c.ascendancy.clone())),
                "skill" => app.select_skill(index).map(|s| s.map(|s| s.main.name.clone())),
                _ => {
                    writeln!(out, "Usage: pick class|skill <n>")?;
                    return Ok(Flow::Continue);
                }
            };
            match result {
                Ok(Some(name)) => writeln!(out, "Selected {}", name)?,
                Ok(None) => writeln!(out, "Deselected")?,
                Err(e) => writeln!(out, "{}", e)?,
            }
        }
        "finalize" => match app.finalize().map(|_| ()) {
            Ok(()) => print_status(app, out)?,
            Err(e) => writeln!(out, "{}", e)?,
        },
        "new" => {
            if confirm("Discard the current build and checklist progress?", lines, out)? {
                app.start_new_build();
                writeln!(out, "Ready for a new build.")?;
            }
        }

        "rename" => report_unit(app.rename_build(rest), out)?,
        "play" => {
            let skill = app
                .build()
                .and_then(|b| b.unlocked().iter().find(|s| s.name.eq_ignore_ascii_case(rest)))
                .cloned();
            match skill {
                Some(skill) => report_unit(app.set_active_skill(skill), out)?,
                None => writeln!(out, "\"{}\" is not unlocked.", rest)?,
            }
        }
        "link" => link_command(app, rest, out)?,

        "tasks" => print_checklist(app, out)?,
        "task" => task_command(app, rest, lines, out)?,

        "skills" => {
            for (tag, skills) in app.catalog().search_skills(rest) {
                let collapsed = app.catalog().is_tag_collapsed(tag);
                let marker = if app.catalog().is_tag_excluded(tag) { " (excluded)" } else { "" };
                writeln!(out, "{}{} [{}]", tag, marker, skills.len())?;
                if collapsed {
                    continue;
                }
                for skill in skills {
                    let hidden = if app.catalog().is_skill_hidden(&skill.name) { " (hidden)" } else { "" };
                    writeln!(out, "  {}{}", skill.name, hidden)?;
                }
            }
        }
        "classes" => {
            for (class, ascendancies) in app.catalog().search_classes(rest) {
                writeln!(out, "{}", class)?;
                if app.catalog().is_class_collapsed(class) {
                    continue;
                }
                for a in ascendancies {
                    let marker = if app.catalog().is_ascendancy_excluded(a) { " (excluded)" } else { "" };
                    writeln!(out, "  {}{}", a, marker)?;
                }
            }
        }
        "skill" => skill_command(app, rest, out)?,
        "tag" => tag_command(app, rest, lines, out)?,
        "class" => class_command(app, rest, lines, out)?,
        "asc" => {
            let (action, name) = rest.split_once(' ').unwrap_or((rest, ""));
            match action {
                "exclude" => {
                    let excluded = app.toggle_ascendancy_exclusion(name);
                    writeln!(out, "{} {}", name, if excluded { "excluded" } else { "included" })?;
                }
                "rm" => writeln!(out, "Removed {} entries", app.delete_ascendancy(name))?,
                _ => writeln!(out, "Usage: asc exclude|rm <ascendancy>")?,
            }
        }
        "reset" => {
            if confirm("Reset the catalog, build and checklist to defaults?", lines, out)? {
                app.reset_to_defaults();
                writeln!(out, "Everything reset to defaults.")?;
            }
        }

        "set" => set_command(app, rest, out)?,
        "filter" => {
            match rest {
                "all" => app.select_all_tags(),
                "none" => app.clear_selected_tags(),
                tag => {
                    app.toggle_selected_tag(tag);
                }
            }
            let tags: Vec<_> = app.settings().selected_tags().iter().cloned().collect();
            writeln!(out, "Selected tags: {}", tags.join(", "))?;
        }
        "pool" => {
            for (group, names) in app.class_pool_preview() {
                writeln!(out, "{}: {}", group, names.join(", "))?;
            }
            for (tag, names) in app.skill_pool_preview() {
                writeln!(out, "{}: {}", tag, names.join(", "))?;
            }
        }

        "share" => {
            let base = if rest.is_empty() {
                std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
            } else {
                rest.to_string()
            };
            match app.share_url(&base) {
                Ok(url) => writeln!(out, "{}", url)?,
                Err(e) => writeln!(out, "{}", e)?,
            }
        }
        "preview" => match SharePreview::open(rest) {
            Ok(preview) => print_preview(&preview, out)?,
            Err(e) => writeln!(out, "Broken link: {}", e)?,
        },

        other => writeln!(out, "Unknown command `{}`. Type `help`.", other)?,
    }
    Ok(Flow::Continue)
}

fn link_command(app: &mut AppState, rest: &str, out: &mut impl Write) -> Result<()> {
    let (action, args) = rest.split_once(' ').unwrap_or((rest, ""));
    match action {
        "add" => {
            let (url, name) = args.split_once(' ').unwrap_or((args, ""));
            match app.add_pob_link(name, url) {
                Ok(link) => writeln!(out, "Added {} ({})", link.name, link.id)?,
                Err(e) => writeln!(out, "{}", e)?,
            }
        }
        "rm" => match app.remove_pob_link(args) {
            Ok(true) => writeln!(out, "Removed")?,
            Ok(false) => writeln!(out, "No link {}", args)?,
            Err(e) => writeln!(out, "{}", e)?,
        },
        "mv" => match parse_pair(args) {
            Some((from, to)) => report_unit(app.reorder_pob_links(from, to).map(|_| ()), out)?,
            None => writeln!(out, "Usage: link mv <from> <to>")?,
        },
        _ => writeln!(out, "Usage: link add|rm|mv")?,
    }
    Ok(())
}

fn task_command(
    app: &mut AppState,
    rest: &str,
    lines: &mut impl Iterator<Item = io::Result<String>>,
    out: &mut impl Write,
) -> Result<()> {
    let (action, args) = rest.split_once(' ').unwrap_or((rest, ""));
    match action {
        "toggle" => match app.toggle_checklist_item(args) {
            Some(_) => print_checklist(app, out)?,
            None => writeln!(out, "No task {}", args)?,
        },
        "add" => match app.add_checklist_item(args) {
            Some(item) => writeln!(out, "Added task {}", item.id)?,
            None => writeln!(out, "Task text cannot be empty.")?,
        },
        "rm" => {
            if !app.delete_checklist_item(args) {
                writeln!(out, "No task {}", args)?;
            }
        }
        "mv" => match parse_pair(args) {
            Some((from, to)) => {
                app.reorder_checklist(from, to);
                print_checklist(app, out)?;
            }
            None => writeln!(out, "Usage: task mv <from> <to>")?,
        },
        "reset" => {
            if confirm("Reset the checklist to its default tasks?", lines, out)? {
                app.reset_checklist();
                print_checklist(app, out)?;
            }
        }
        _ => writeln!(out, "Usage: task toggle|add|rm|mv|reset")?,
    }
    Ok(())
}

fn skill_command(app: &mut AppState, rest: &str, out: &mut impl Write) -> Result<()> {
    let (action, args) = rest.split_once(' ').unwrap_or((rest, ""));
    match action {
        "add" => {
            let mut parts = args.split('|').map(str::trim);
            let name = parts.next().unwrap_or_default();
            let tag = parts.next().unwrap_or_default();
            let url = parts.next().unwrap_or_default();
            match app.add_skill(SkillRecord::new(name, tag, url)) {
                Ok(skill) => writeln!(out, "Added {} under {}", skill.name, skill.tag)?,
                Err(e) => writeln!(out, "{}", e)?,
            }
        }
        "rm" => {
            if !app.delete_skill(args) {
                writeln!(out, "No skill {}", args)?;
            }
        }
        "hide" => {
            let hidden = app.toggle_skill_visibility(args);
            writeln!(out, "{} {}", args, if hidden { "hidden" } else { "visible" })?;
        }
        _ => writeln!(out, "Usage: skill add|rm|hide")?,
    }
    Ok(())
}

fn tag_command(
    app: &mut AppState,
    rest: &str,
    lines: &mut impl Iterator<Item = io::Result<String>>,
    out: &mut impl Write,
) -> Result<()> {
    let (action, tag) = rest.split_once(' ').unwrap_or((rest, ""));
    match action {
        "exclude" => {
            let excluded = app.toggle_tag_exclusion(tag);
            writeln!(out, "{} {}", tag, if excluded { "excluded" } else { "included" })?;
        }
        "collapse" => {
            app.toggle_tag_collapse(tag);
        }
        "rm" => {
            if confirm(&format!("Delete every skill tagged {}?", tag), lines, out)? {
                writeln!(out, "Removed {} skills", app.delete_tag(tag))?;
            }
        }
        _ => writeln!(out, "Usage: tag exclude|collapse|rm <tag>")?,
    }
    Ok(())
}

fn class_command(
    app: &mut AppState,
    rest: &str,
    lines: &mut impl Iterator<Item = io::Result<String>>,
    out: &mut impl Write,
) -> Result<()> {
    let (action, class) = rest.split_once(' ').unwrap_or((rest, ""));
    match action {
        "exclude" => {
            let state = match app.toggle_class_exclusion(class) {
                ClassExclusion::None => "included",
                ClassExclusion::Some => "partly excluded",
                ClassExclusion::All => "excluded",
            };
            writeln!(out, "{} {}", class, state)?;
        }
        "collapse" => {
            app.toggle_class_collapse(class);
        }
        "rm" => {
            if confirm(&format!("Delete {} and all its ascendancies?", class), lines, out)? {
                writeln!(out, "Removed {} ascendancies", app.delete_class(class))?;
            }
        }
        _ => writeln!(out, "Usage: class exclude|collapse|rm <class>")?,
    }
    Ok(())
}

fn set_command(app: &mut AppState, rest: &str, out: &mut impl Write) -> Result<()> {
    let (key, value) = rest.split_once(' ').unwrap_or((rest, ""));
    let flag = match value {
        "on" | "true" | "yes" => Some(true),
        "off" | "false" | "no" => Some(false),
        _ => None,
    };
    match (key, value.parse::<u64>().ok(), flag) {
        ("classes", Some(n), _) => writeln!(out, "Class count: {}", app.set_class_count(n as usize))?,
        ("skills", Some(n), _) => writeln!(out, "Skill count: {}", app.set_skill_count(n as usize))?,
        ("delay", Some(ms), _) => app.set_roll_delay(Duration::from_millis(ms)),
        ("ascendancy", _, Some(on)) => app.set_ascendancy_mode(on),
        ("unlock", _, Some(on)) => app.set_unlock_mode_enabled(on),
        _ => writeln!(out, "Usage: set classes|skills|delay <n> | set ascendancy|unlock on|off")?,
    }
    Ok(())
}

/// 1-based position from user input
fn parse_position(text: &str) -> Option<usize> {
    text.trim().parse::<usize>().ok()?.checked_sub(1)
}

fn parse_pair(text: &str) -> Option<(usize, usize)> {
    let (a, b) = text.split_once(' ')?;
    Some((parse_position(a)?, parse_position(b)?))
}

fn report_unit(result: Result<(), buildroller::ValidationError>, out: &mut impl Write) -> Result<()> {
    match result {
        Ok(()) => writeln!(out, "Done")?,
        Err(e) => writeln!(out, "{}", e)?,
    }
    Ok(())
}

fn print_draft(app: &AppState, out: &mut impl Write) -> Result<()> {
    let draft = app.draft();
    if !draft.classes.is_empty() {
        writeln!(out, "Classes:")?;
        for (i, c) in draft.classes.iter().enumerate() {
            let mark = if draft.selected_class.as_ref() == Some(&c.data) { "*" } else { " " };
            writeln!(out, " {}{}. {} ({})", mark, i + 1, c.data.ascendancy, c.data.class)?;
        }
    }
    writeln!(out, "Skills:")?;
    for (i, s) in draft.skills.iter().enumerate() {
        let selected = draft.selected_skill.as_ref().is_some_and(|p| p.main.name == s.main.name);
        let mark = if selected { "*" } else { " " };
        writeln!(out, " {}{}. {} [{}]", mark, i + 1, s.main.name, s.main.tag)?;
    }
    Ok(())
}

fn print_status(app: &AppState, out: &mut impl Write) -> Result<()> {
    match (app.phase(), app.build()) {
        (Phase::BuildActive, Some(build)) => {
            writeln!(out, "Build: {}", build.display_name())?;
            if let Some(class) = &build.selected_class {
                writeln!(out, "  Class: {} ({})", class.ascendancy, class.class)?;
            }
            writeln!(out, "  Playing: {}", build.main_skill.name)?;
            let unlocked: Vec<_> = build
                .unlocked()
                .iter()
                .map(|s| {
                    if build.is_active_skill(&s.name) {
                        format!("{} *", s.name)
                    } else {
                        s.name.clone()
                    }
                })
                .collect();
            writeln!(out, "  Unlocked: {}", unlocked.join(", "))?;
            for (i, link) in build.pob_links.iter().enumerate() {
                writeln!(out, "  {}. {} <{}> ({})", i + 1, link.name, link.url, link.id)?;
            }
            writeln!(
                out,
                "  Progress: {}% ({} unlock points)",
                app.ledger().completion_percentage(),
                app.available_points()
            )?;
            if app.is_unlock_mode() {
                writeln!(out, "  Unlock mode is on; `roll` offers new skills.")?;
            }
        }
        (Phase::DraftInProgress, _) => print_draft(app, out)?,
        _ => writeln!(out, "No build yet. `roll` to draft one.")?,
    }
    Ok(())
}

fn print_checklist(app: &AppState, out: &mut impl Write) -> Result<()> {
    for item in app.ledger().items() {
        let mark = if item.is_completed { "x" } else { " " };
        writeln!(out, "[{}] {} ({})", mark, item.text, item.id)?;
    }
    writeln!(out, "{}% complete", app.ledger().completion_percentage())?;
    Ok(())
}

fn print_preview(preview: &SharePreview, out: &mut impl Write) -> Result<()> {
    let build = preview.build();
    writeln!(out, "Shared build: {}", build.display_name())?;
    if let Some(class) = &build.selected_class {
        writeln!(out, "  Class: {} ({})", class.ascendancy, class.class)?;
    }
    writeln!(out, "  Playing: {}", build.main_skill.name)?;
    for skill in preview.unlocked_skills() {
        writeln!(out, "  - {} [{}] {}", skill.name, skill.tag, skill.url)?;
    }
    for link in preview.links() {
        writeln!(out, "  {} <{}>", link.name, link.url)?;
    }
    writeln!(
        out,
        "  Progress: {}/{} tasks ({}%)",
        preview.completed_count(),
        preview.checklist().len(),
        preview.completion_percentage()
    )?;
    Ok(())
}
