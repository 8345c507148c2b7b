//! Command dispatch: one handler per subcommand

use std::io;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::services::FetchDepth;
use crate::cli::args::{Cli, Commands, ConfigCommands, Depth, StudentCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings};
use crate::domain::{CourseRecord, DeleteOutcome, Grade, Student, TreeNodeConvert};
use crate::infrastructure::ServiceContainer;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see `degreetree --help`".into(),
        ));
    };

    match command {
        Commands::Completion { shell } => _completion(*shell),
        Commands::Config { command } => _config(cli, command),
        command => {
            let settings = Settings::load(cli.config.as_deref())?;
            let container = ServiceContainer::new(settings)?;
            match command {
                Commands::Programmes => _programmes(&container),
                Commands::Tree { group_id, depth } => _tree(&container, group_id, *depth),
                Commands::Course { group_id } => _course(&container, group_id),
                Commands::Search { keyword } => _search(&container, keyword),
                Commands::Student { command } => _student(&container, command),
                Commands::Completion { .. } | Commands::Config { .. } => Ok(()),
            }
        }
    }
}

fn _completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    eprintln!("Generating completion file for {shell:?}...");
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}

fn _config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(cli.config.as_deref())?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => {
                    let marker = if path.exists() { "" } else { " (not found)" };
                    output::action("global", &format!("{}{}", path.display(), marker));
                }
                None => output::warning("cannot determine global config directory"),
            }
            if let Some(path) = &cli.config {
                output::action("explicit", &path.display());
            }
        }
    }
    Ok(())
}

#[instrument(skip(container))]
fn _programmes(container: &ServiceContainer) -> CliResult<()> {
    let programmes = container.catalog_service().list_programmes()?;
    if programmes.is_empty() {
        output::warning("no degree programmes found");
        return Ok(());
    }
    for programme in &programmes {
        output::info(&format!(
            "{:<14} {} ({})",
            programme.code.as_deref().unwrap_or("-"),
            programme.name.as_deref().unwrap_or("?"),
            programme.group_id
        ));
    }
    debug!("programmes: count={}", programmes.len());
    Ok(())
}

#[instrument(skip(container))]
fn _tree(container: &ServiceContainer, group_id: &str, depth: Depth) -> CliResult<()> {
    let depth = match depth {
        Depth::One => FetchDepth::One,
        Depth::Full => FetchDepth::Full,
    };
    let tree = container.catalog_service().tree(group_id, depth)?;
    output::info(&tree.to_tree_string());
    output::detail(&format!(
        "{} modules, depth {}",
        tree.node_count(),
        tree.depth()
    ));
    Ok(())
}

#[instrument(skip(container))]
fn _course(container: &ServiceContainer, group_id: &str) -> CliResult<()> {
    let course = container.catalog_service().course(group_id)?;
    print_course(&course);
    Ok(())
}

#[instrument(skip(container))]
fn _search(container: &ServiceContainer, keyword: &str) -> CliResult<()> {
    let courses = container.catalog_service().search_courses(keyword)?;
    if courses.is_empty() {
        output::warning(&format!("no courses match '{keyword}'"));
        return Ok(());
    }
    output::header(&format!("{} courses", courses.len()));
    for course in &courses {
        output::info(&format!("{}  ({})", course, course.group_id));
    }
    Ok(())
}

fn _student(container: &ServiceContainer, command: &StudentCommands) -> CliResult<()> {
    let students = container.student_service();
    match command {
        StudentCommands::List => {
            let all = students.list()?;
            if all.is_empty() {
                output::warning(&format!(
                    "no students in {}",
                    container.settings.students_dir.display()
                ));
            }
            for student in &all {
                output::info(student);
            }
        }
        StudentCommands::Add {
            student_id,
            first_name,
            last_name,
        } => {
            let student = students.add(student_id, first_name, last_name)?;
            output::success(&format!("added {student}"));
        }
        StudentCommands::Edit {
            student_id,
            first_name,
            last_name,
        } => {
            let student = students.edit(student_id, first_name, last_name)?;
            output::success(&format!("renamed {student}"));
        }
        StudentCommands::Show { student_id } => {
            print_student(&students.show(student_id)?);
        }
        StudentCommands::Delete { student_id } => {
            students.delete(student_id)?;
            output::success(&format!("deleted {student_id}"));
        }
        StudentCommands::Programme {
            student_id,
            programme_id,
        } => {
            let student = students.assign_programme(student_id, programme_id)?;
            output::success(&format!(
                "{} assigned to {}",
                student.student_id,
                student.programme_name.as_deref().unwrap_or(programme_id)
            ));
        }
        StudentCommands::Grade {
            student_id,
            module_id,
            course_id,
            grade,
        } => {
            let grade = grade.as_deref().map(str::parse::<Grade>).transpose()?;
            let student = students.set_grade(student_id, module_id, course_id, grade)?;
            let shown = grade.map(|g| g.to_string()).unwrap_or_else(|| "cleared".into());
            output::success(&format!("{course_id}: {shown}"));
            output::detail(&format!(
                "completed credits: {}",
                student.total_completed_credits()
            ));
        }
        StudentCommands::Choose {
            student_id,
            module_id,
            course_id,
        } => {
            let student = students.choose_course(student_id, module_id, course_id)?;
            output::success(&format!("chose {course_id} in {module_id}"));
            print_chosen(&student, module_id);
        }
        StudentCommands::Unchoose {
            student_id,
            module_id,
            course_id,
        } => {
            if students.unchoose_course(student_id, module_id, course_id)? {
                output::success(&format!("un-chose {course_id} in {module_id}"));
            } else {
                output::warning(&format!("{course_id} was not chosen in {module_id}"));
            }
        }
        StudentCommands::Drop {
            student_id,
            course_id,
            module,
        } => match students.drop_course(student_id, course_id, module.as_deref())? {
            DeleteOutcome::Completed => output::success(&format!("removed {course_id}")),
            DeleteOutcome::Refused => {
                output::warning(&format!("{course_id} is mandatory and was kept"))
            }
        },
        StudentCommands::Credits { student_id } => {
            let credits = students.completed_credits(student_id)?;
            output::action("completed", &format!("{credits} op"));
        }
    }
    Ok(())
}

fn print_course(course: &CourseRecord) {
    output::header(course);
    output::field("group id", &course.group_id);
    output::field("grading", if course.graded { "0-5" } else { "pass/fail" });
    for (label, text) in [
        ("description", &course.description),
        ("outcomes", &course.outcomes),
        ("prerequisites", &course.prerequisites),
    ] {
        if let Some(text) = text {
            output::field(label, text);
        }
    }
}

fn print_student(student: &Student) {
    output::header(student);
    match student.programme() {
        Some(programme) => {
            output::info(&programme.to_tree_string());
            output::action(
                "completed",
                &format!(
                    "{} / {} op",
                    student.total_completed_credits(),
                    programme.target_credits
                ),
            );
        }
        None => output::detail("no degree programme assigned"),
    }
}

fn print_chosen(student: &Student, module_id: &str) {
    if let Some(module) = student.module(module_id) {
        output::detail(&format!(
            "chosen: {}",
            module.chosen_courses().iter().join(", ")
        ));
    }
}
