use std::collections::BTreeMap;
use std::fmt::Write;

use chrono::NaiveDate;
use rand::Rng;

use crate::models::{GeneratedComment, PickHistoryEntry, ScoreSheet, Student};
use crate::scores::{self, EvaluationKind};

/// Pick counts per student, most-drawn first.
pub fn summarize_picks(history: &[PickHistoryEntry]) -> Vec<(String, usize)> {
    let mut map: std::collections::HashMap<String, usize> = std::collections::HashMap::new();

    for entry in history {
        *map.entry(entry.student.name.clone()).or_insert(0) += 1;
    }

    let mut summaries: Vec<(String, usize)> = map.into_iter().collect();
    summaries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    summaries
}

pub fn build_comment_report(
    students: &[Student],
    comments: &BTreeMap<String, GeneratedComment>,
    generated_on: NaiveDate,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# 学生评语报告");
    let _ = writeln!(output, "生成日期：{}，共 {} 名学生", generated_on, comments.len());
    let _ = writeln!(output);

    if comments.is_empty() {
        let _ = writeln!(output, "暂无评语。");
        return output;
    }

    for student in students {
        let Some(generated) = comments.get(&student.id) else {
            continue;
        };
        let _ = writeln!(output, "## {}", student.name);
        let _ = writeln!(output);
        let _ = writeln!(output, "{}", generated.comment);
        if generated.used_tags.is_empty() {
            let _ = writeln!(output, "（未使用标签）");
        } else {
            let _ = writeln!(output, "使用标签：{}", generated.used_tags.join("、"));
        }
        let _ = writeln!(output);
    }

    output
}

pub fn build_intelligence_report(
    sheet: &ScoreSheet,
    generated_on: NaiveDate,
    rng: &mut impl Rng,
) -> String {
    let stats = scores::subject_statistics(sheet);
    let profiles = scores::profile_sheet(sheet);

    let mut output = String::new();
    let _ = writeln!(output, "# 多元智能测评分析报告");
    let _ = writeln!(
        output,
        "生成日期：{}，参与学生 {} 人",
        generated_on,
        sheet.rows.len()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## 测评项目统计");

    if stats.is_empty() {
        let _ = writeln!(output, "暂无统计数据。");
    } else {
        let _ = writeln!(output, "| 项目 | 平均分 | 最高分 | 最低分 | 人数 | 及格率 |");
        let _ = writeln!(output, "| --- | --- | --- | --- | --- | --- |");
        for stat in stats.iter() {
            let _ = writeln!(
                output,
                "| {} | {:.2} | {} | {} | {} | {:.1}% |",
                stat.subject, stat.average, stat.max, stat.min, stat.count, stat.pass_rate
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## 学生个性化分析");

    if profiles.is_empty() {
        let _ = writeln!(output, "暂无学生数据。");
    } else {
        for profile in profiles.iter() {
            let _ = writeln!(output);
            let _ = writeln!(output, "### {}（{}）", profile.name, profile.class);
            for (intelligence, score) in profile.scores.iter() {
                let _ = writeln!(output, "- {}：{:.2}", intelligence, score);
            }
            if !profile.strengths.is_empty() {
                let _ = writeln!(
                    output,
                    "{}：{}",
                    EvaluationKind::Strength.label(),
                    scores::evaluation_text(&profile.strengths, EvaluationKind::Strength, rng)
                );
            }
            if !profile.weaknesses.is_empty() {
                let _ = writeln!(
                    output,
                    "{}：{}",
                    EvaluationKind::Weakness.label(),
                    scores::evaluation_text(&profile.weaknesses, EvaluationKind::Weakness, rng)
                );
                let _ = writeln!(
                    output,
                    "{}：{}",
                    EvaluationKind::Strategy.label(),
                    scores::evaluation_text(&profile.weaknesses, EvaluationKind::Strategy, rng)
                );
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EvaluationTags, ScoreRow};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn student(id: &str, name: &str) -> Student {
        Student {
            id: id.to_string(),
            name: name.to_string(),
            evaluation_tags: EvaluationTags::default(),
        }
    }

    #[test]
    fn pick_summary_counts_and_orders() {
        let history: Vec<PickHistoryEntry> = [("a", "张小明"), ("b", "李小红"), ("a", "张小明")]
            .iter()
            .map(|(id, name)| PickHistoryEntry {
                student: student(id, name),
                time: 0,
            })
            .collect();

        let summary = summarize_picks(&history);
        assert_eq!(summary, vec![("张小明".to_string(), 2), ("李小红".to_string(), 1)]);
    }

    #[test]
    fn comment_report_lists_each_student_once() {
        let students = vec![student("1", "张小明"), student("2", "李小红")];
        let mut comments = BTreeMap::new();
        comments.insert(
            "1".to_string(),
            GeneratedComment {
                comment: "张小明同学\n很棒。".to_string(),
                used_tags: vec!["活泼开朗".to_string()],
            },
        );
        comments.insert(
            "2".to_string(),
            GeneratedComment {
                comment: "李小红同学\n加油。".to_string(),
                used_tags: Vec::new(),
            },
        );

        let report = build_comment_report(&students, &comments, NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
        assert!(report.starts_with("# 学生评语报告"));
        assert!(report.contains("## 张小明"));
        assert!(report.contains("使用标签：活泼开朗"));
        assert!(report.contains("## 李小红"));
        assert!(report.contains("（未使用标签）"));
    }

    #[test]
    fn empty_comment_report_says_so() {
        let report = build_comment_report(
            &[],
            &BTreeMap::new(),
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
        );
        assert!(report.contains("暂无评语。"));
    }

    #[test]
    fn intelligence_report_has_statistics_and_profiles() {
        let mut scores_map = HashMap::new();
        scores_map.insert("语文".to_string(), 5.0);
        scores_map.insert("数学".to_string(), 2.0);
        let sheet = ScoreSheet {
            subjects: vec!["语文".to_string(), "数学".to_string()],
            rows: vec![ScoreRow {
                class: "一年级1班".to_string(),
                name: "张小明".to_string(),
                scores: scores_map,
            }],
        };

        let mut rng = StdRng::seed_from_u64(1);
        let report =
            build_intelligence_report(&sheet, NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(), &mut rng);
        assert!(report.contains("## 测评项目统计"));
        assert!(report.contains("| 语文 | 5.00 | 5 | 5 | 1 | 100.0% |"));
        assert!(report.contains("### 张小明（一年级1班）"));
        assert!(report.contains("优势智能："));
    }
}
