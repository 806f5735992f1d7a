use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;

mod comment;
mod models;
mod picker;
mod report;
mod scores;
mod store;
mod templates;

use comment::CommentGenerator;
use picker::Picker;
use store::Store;
use templates::TemplateLibrary;

#[derive(Parser)]
#[command(name = "classroom-companion")]
#[command(about = "Roster, comment generation, student picking and score analysis for teachers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load realistic sample students
    Seed,
    /// Add students from one comma-separated line of names
    Add { names: String },
    /// List the roster
    List,
    /// Replace one tag category for a student (id or exact name)
    Tag {
        student: String,
        #[arg(long)]
        category: String,
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
    },
    /// Remove a student (id or exact name)
    Remove { student: String },
    /// Remove every student from the roster
    ClearStudents,
    /// Write the comment template library to a JSON file for editing
    ExportTemplates {
        /// Defaults to templates.json inside the data directory, where
        /// comment generation picks it up automatically
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Export the roster to a JSON file
    Export {
        #[arg(long, default_value = "students.json")]
        out: PathBuf,
    },
    /// Import students from a JSON export
    Import {
        #[arg(long)]
        json: PathBuf,
    },
    /// Generate one comment for a student
    Comment {
        student: String,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Generate comments for the whole roster
    BatchComments {
        /// Write the markdown report here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long, default_value_t = 300)]
        delay_ms: u64,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Spin the picker and draw one student
    Pick {
        /// Spin animation length in seconds
        #[arg(long, default_value_t = 2)]
        duration: u64,
        /// Exclude students already drawn since the last reset
        #[arg(long)]
        avoid_repeat: bool,
        /// Leave these students (id or exact name) out of the pool
        #[arg(long)]
        exclude: Vec<String>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Show the pick history
    History {
        /// Show per-student pick counts instead of the raw log
        #[arg(long)]
        stats: bool,
    },
    /// Clear the pick history
    ResetHistory,
    /// Analyze a score-sheet CSV and build the intelligence report
    Analyze {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("classroom_companion=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let store = Store::open(Store::dir_from_env())?;

    match cli.command {
        Commands::Seed => {
            let inserted = store.seed()?;
            println!("已导入 {inserted} 名示例学生。");
        }
        Commands::Add { names } => {
            let added = store.add_bulk(&names)?;
            if added.is_empty() {
                println!("没有可添加的学生姓名。");
            } else {
                println!("已添加 {} 名学生。", added.len());
            }
        }
        Commands::List => {
            let students = store.load_students()?;
            if students.is_empty() {
                println!("学生名单为空，请先添加学生。");
            } else {
                println!("共 {} 名学生：", students.len());
                for student in students.iter() {
                    println!(
                        "- {} ({}) 标签 {} 个",
                        student.name,
                        student.id,
                        student.evaluation_tags.all().len()
                    );
                }
            }
        }
        Commands::Tag {
            student,
            category,
            tags,
        } => {
            let updated = store.set_tags(&student, &category, tags)?;
            println!(
                "已更新 {} 的标签，共 {} 个。",
                updated.name,
                updated.evaluation_tags.all().len()
            );
        }
        Commands::Remove { student } => {
            let removed = store.remove_student(&student)?;
            println!("已删除学生 {}。", removed.name);
        }
        Commands::ClearStudents => {
            let removed = store.clear_students()?;
            println!("已清空学生名单，共删除 {removed} 名学生。");
        }
        Commands::ExportTemplates { out } => {
            let path = out.unwrap_or_else(|| store.templates_path());
            let library = TemplateLibrary::load_or_builtin(&store.templates_path())?;
            library.save(&path)?;
            println!("评语模板已写入 {}。", path.display());
        }
        Commands::Export { out } => {
            let count = store.export_students(&out)?;
            println!("已导出 {} 名学生到 {}。", count, out.display());
        }
        Commands::Import { json } => {
            let imported = store.import_students(&json)?;
            if imported == 0 {
                println!("导入的学生都已存在，没有新增学生。");
            } else {
                println!("成功导入 {imported} 名学生。");
            }
        }
        Commands::Comment { student, seed } => {
            let students = store.load_students()?;
            let found = students
                .iter()
                .find(|s| s.id == student || s.name == student)
                .with_context(|| format!("no student matches {student}"))?;

            let library = TemplateLibrary::load_or_builtin(&store.templates_path())?;
            let generator = CommentGenerator::new(&library);
            let mut rng = make_rng(seed);
            let result = generator.generate(&found.name, &found.evaluation_tags, &mut rng);

            println!("{}", result.comment);
            if !result.used_tags.is_empty() {
                println!();
                println!("使用标签：{}", result.used_tags.join("、"));
            }
        }
        Commands::BatchComments {
            out,
            delay_ms,
            seed,
        } => {
            let students = store.load_students()?;
            if students.is_empty() {
                println!("学生名单为空，请先添加学生。");
                return Ok(());
            }

            let library = TemplateLibrary::load_or_builtin(&store.templates_path())?;
            let generator = CommentGenerator::new(&library);
            let mut rng = make_rng(seed);

            let comments = generator
                .generate_batch(
                    &students,
                    Duration::from_millis(delay_ms),
                    |completed, total| {
                        print!("\r生成进度 {completed}/{total}");
                        let _ = std::io::stdout().flush();
                    },
                    &mut rng,
                )
                .await;
            println!();

            let report =
                report::build_comment_report(&students, &comments, Utc::now().date_naive());
            match out {
                Some(path) => {
                    std::fs::write(&path, report)?;
                    println!("评语报告已写入 {}。", path.display());
                }
                None => print!("{report}"),
            }
        }
        Commands::Pick {
            duration,
            avoid_repeat,
            exclude,
            seed,
        } => {
            let students = store.load_students()?;
            let history = store.load_history()?;

            let exclude_ids: Vec<String> = exclude
                .iter()
                .filter_map(|query| {
                    students
                        .iter()
                        .find(|s| s.id == *query || s.name == *query)
                        .map(|s| s.id.clone())
                })
                .collect();

            let mut picker = Picker::new(students, history, avoid_repeat);
            for id in exclude_ids.iter() {
                picker.deselect(id);
            }

            if !picker.start() {
                println!("没有可抽取的学生。");
                return Ok(());
            }

            let mut ticker = tokio::time::interval(Duration::from_millis(60));
            let deadline = tokio::time::Instant::now() + Duration::from_secs(duration.max(1));
            while tokio::time::Instant::now() < deadline {
                ticker.tick().await;
                picker.tick();
                if let Some(current) = picker.current() {
                    print!("\r正在抽取：{}        ", current.name);
                    let _ = std::io::stdout().flush();
                }
            }
            drop(ticker);

            let mut rng = make_rng(seed);
            let winner = picker.stop(&mut rng).context("the draw produced no winner")?;
            println!();
            println!("🏆 本次抽中：{}", winner.name);

            store.save_history(&picker.into_history())?;
        }
        Commands::History { stats } => {
            let history = store.load_history()?;
            if history.is_empty() {
                println!("还没有抽取记录。");
            } else if stats {
                println!("抽取统计：");
                for (name, count) in report::summarize_picks(&history) {
                    println!("- {name}：{count} 次");
                }
            } else {
                println!("抽取历史（最近在前）：");
                for entry in history.iter() {
                    let time = chrono::DateTime::from_timestamp_millis(entry.time)
                        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                        .unwrap_or_else(|| entry.time.to_string());
                    println!("- {} @ {}", entry.student.name, time);
                }
            }
        }
        Commands::ResetHistory => {
            let students = store.load_students()?;
            let history = store.load_history()?;
            let mut picker = Picker::new(students, history, true);
            picker.reset();
            let restored = picker.available().len();
            store.save_history(&picker.into_history())?;
            println!("抽取记录已清空，{restored} 名学生全部可抽取。");
        }
        Commands::Analyze { csv, out, seed } => {
            let sheet = scores::load_score_sheet(&csv)?;
            if sheet.rows.is_empty() {
                println!("测评表中没有学生数据。");
                return Ok(());
            }

            let mut rng = make_rng(seed);
            let report =
                report::build_intelligence_report(&sheet, Utc::now().date_naive(), &mut rng);
            match out {
                Some(path) => {
                    std::fs::write(&path, report)?;
                    println!("分析报告已写入 {}。", path.display());
                }
                None => print!("{report}"),
            }
        }
    }

    Ok(())
}
