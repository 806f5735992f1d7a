use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::{IntelligenceProfile, ScoreRow, ScoreSheet, SubjectStatistics};

/// Intelligence dimension -> subject keywords matched against sheet
/// column names.
pub const INTELLIGENCE_MAPPING: &[(&str, &[&str])] = &[
    ("言语语言智能", &["语文", "英语"]),
    ("逻辑数理智能", &["数学"]),
    ("自然观察智能", &["科学"]),
    ("视觉空间智能", &["科创", "美术"]),
    ("身体运动智能", &["体育"]),
    ("内省智能", &["劳动"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationKind {
    Strength,
    Weakness,
    Strategy,
}

impl EvaluationKind {
    pub fn label(&self) -> &'static str {
        match self {
            EvaluationKind::Strength => "优势智能",
            EvaluationKind::Weakness => "弱势智能",
            EvaluationKind::Strategy => "提升策略",
        }
    }

    fn templates(&self) -> &'static [(&'static str, &'static [&'static str])] {
        match self {
            EvaluationKind::Strength => STRENGTH_TEMPLATES,
            EvaluationKind::Weakness => WEAKNESS_TEMPLATES,
            EvaluationKind::Strategy => STRATEGY_TEMPLATES,
        }
    }
}

/// Reads a score sheet CSV: first column class, second column student
/// name, remaining columns scored items on the 1-5 scale. Cells that do
/// not parse as numbers are ignored.
pub fn load_score_sheet(path: &Path) -> anyhow::Result<ScoreSheet> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open score sheet {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("missing header row in {}", path.display()))?
        .clone();
    if headers.len() < 2 {
        anyhow::bail!("score sheet needs class and name columns plus score columns");
    }
    let subjects: Vec<String> = headers.iter().skip(2).map(|h| h.trim().to_string()).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let class = record.get(0).unwrap_or_default().trim().to_string();
        let name = record.get(1).unwrap_or_default().trim().to_string();
        if name.is_empty() {
            continue;
        }

        let mut scores = HashMap::new();
        for (index, subject) in subjects.iter().enumerate() {
            if let Some(cell) = record.get(index + 2) {
                if let Ok(score) = cell.trim().parse::<f64>() {
                    scores.insert(subject.clone(), score);
                }
            }
        }
        rows.push(ScoreRow { class, name, scores });
    }

    Ok(ScoreSheet { subjects, rows })
}

fn strip_quotes(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '"' | '\'' | '“' | '”' | '‘' | '’'))
        .collect()
}

/// Per-intelligence score for one student: the average of positive scores
/// from columns whose (quote-stripped) name matches a mapped subject
/// keyword. Dimensions with no matching column score 0.
pub fn intelligence_scores(sheet: &ScoreSheet, row: &ScoreRow) -> Vec<(String, f64)> {
    INTELLIGENCE_MAPPING
        .iter()
        .map(|(intelligence, subjects)| {
            let values: Vec<f64> = subjects
                .iter()
                .filter_map(|subject| {
                    let cleaned_subject = strip_quotes(subject);
                    let column = sheet.subjects.iter().find(|column| {
                        let cleaned_column = strip_quotes(column.as_str());
                        cleaned_column == cleaned_subject
                            || cleaned_column.contains(&cleaned_subject)
                            || cleaned_subject.contains(&cleaned_column)
                    })?;
                    row.scores.get(column.as_str()).copied()
                })
                .filter(|score| *score > 0.0)
                .collect();

            let score = if values.is_empty() {
                0.0
            } else {
                values.iter().sum::<f64>() / values.len() as f64
            };
            (intelligence.to_string(), score)
        })
        .collect()
}

/// Strengths are the two highest dimensions; weaknesses the two lowest
/// among those strictly below the mean.
pub fn analyze(scores: &[(String, f64)]) -> (Vec<String>, Vec<String>) {
    let mut sorted: Vec<&(String, f64)> = scores.iter().collect();
    sorted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let strengths: Vec<String> = sorted.iter().take(2).map(|(name, _)| name.clone()).collect();

    let mean = if scores.is_empty() {
        0.0
    } else {
        scores.iter().map(|(_, score)| score).sum::<f64>() / scores.len() as f64
    };
    let below_mean: Vec<&(String, f64)> = sorted
        .iter()
        .copied()
        .filter(|(_, score)| *score < mean)
        .collect();
    let start = below_mean.len().saturating_sub(2);
    let weaknesses: Vec<String> = below_mean[start..]
        .iter()
        .map(|(name, _)| name.clone())
        .collect();

    (strengths, weaknesses)
}

/// Builds the full profile for every row of the sheet.
pub fn profile_sheet(sheet: &ScoreSheet) -> Vec<IntelligenceProfile> {
    sheet
        .rows
        .iter()
        .map(|row| {
            let scores = intelligence_scores(sheet, row);
            let (strengths, weaknesses) = analyze(&scores);
            IntelligenceProfile {
                class: row.class.clone(),
                name: row.name.clone(),
                scores,
                strengths,
                weaknesses,
            }
        })
        .collect()
}

/// One random template per intelligence, joined with "；" and closed with
/// "。". Dimensions without a template contribute nothing.
pub fn evaluation_text(
    intelligences: &[String],
    kind: EvaluationKind,
    rng: &mut impl Rng,
) -> String {
    let table = kind.templates();
    let mut parts = Vec::new();
    for intelligence in intelligences {
        if let Some((_, templates)) = table.iter().find(|(name, _)| *name == intelligence.as_str()) {
            if let Some(text) = templates.choose(rng) {
                parts.push(text.to_string());
            }
        }
    }
    parts.join("；") + "。"
}

/// Per-column statistics across the sheet. Pass rate is the share of
/// scores at or above 3.0 on the 5-point scale, as a percentage.
pub fn subject_statistics(sheet: &ScoreSheet) -> Vec<SubjectStatistics> {
    sheet
        .subjects
        .iter()
        .filter_map(|subject| {
            let scores: Vec<f64> = sheet
                .rows
                .iter()
                .filter_map(|row| row.scores.get(subject.as_str()).copied())
                .collect();
            if scores.is_empty() {
                return None;
            }

            let sum: f64 = scores.iter().sum();
            let average = sum / scores.len() as f64;
            let max = scores.iter().cloned().fold(f64::MIN, f64::max);
            let min = scores.iter().cloned().fold(f64::MAX, f64::min);
            let passing = scores.iter().filter(|s| **s >= 3.0).count();
            let pass_rate = passing as f64 / scores.len() as f64 * 100.0;

            Some(SubjectStatistics {
                subject: subject.clone(),
                average: (average * 100.0).round() / 100.0,
                max,
                min,
                count: scores.len(),
                pass_rate: (pass_rate * 10.0).round() / 10.0,
            })
        })
        .collect()
}

const STRENGTH_TEMPLATES: &[(&str, &[&str])] = &[
    (
        "言语语言智能",
        &[
            "语言表达能力突出，善于用词汇表达思想",
            "阅读理解能力强，能够深入理解文本内容",
            "写作能力优秀，文字表达生动有趣",
            "口语表达流畅，善于与他人沟通交流",
        ],
    ),
    (
        "逻辑数理智能",
        &[
            "数学思维敏捷，善于运用逻辑推理",
            "计算能力强，对数字敏感度高",
            "问题解决能力突出，善于分析和总结",
            "抽象思维能力优秀，能理解复杂概念",
        ],
    ),
    (
        "自然观察智能",
        &[
            "观察能力敏锐，善于发现自然规律",
            "对科学实验充满兴趣，动手能力强",
            "环境适应能力好，热爱自然探索",
            "分类整理能力强，善于归纳总结",
        ],
    ),
    (
        "视觉空间智能",
        &[
            "空间想象力丰富，艺术创作能力强",
            "色彩感知敏锐，美术表现力突出",
            "设计思维活跃，创新意识强",
            "手工制作精巧，动手实践能力优秀",
        ],
    ),
    (
        "身体运动智能",
        &[
            "身体协调性好，运动技能掌握快",
            "体能素质优秀，运动表现突出",
            "团队合作意识强，体育精神佳",
            "身体控制能力强，动作准确到位",
        ],
    ),
    (
        "内省智能",
        &[
            "自我认知清晰，善于反思总结",
            "情绪管理能力强，心理素质好",
            "责任感强，做事认真负责",
            "独立思考能力强，有自己的见解",
        ],
    ),
];

const WEAKNESS_TEMPLATES: &[(&str, &[&str])] = &[
    (
        "言语语言智能",
        &[
            "语言表达需要进一步提升，可多练习口语交流",
            "阅读理解有待加强，建议增加阅读量",
            "写作表达还需完善，可多进行写作练习",
        ],
    ),
    (
        "逻辑数理智能",
        &[
            "数学思维需要加强训练，可多做逻辑推理题",
            "计算准确性有待提高，需要加强基础练习",
            "抽象思维能力需要培养，可通过游戏等方式练习",
        ],
    ),
    (
        "自然观察智能",
        &[
            "观察能力需要培养，建议多参与科学实验",
            "对自然现象的兴趣需要激发，可多进行户外观察",
            "科学探究精神有待加强，鼓励多提问和实践",
        ],
    ),
    (
        "视觉空间智能",
        &[
            "空间想象力需要训练，可通过拼图等游戏提升",
            "艺术表现力有待开发，建议多参与美术活动",
            "创新思维需要培养，鼓励多进行创意制作",
        ],
    ),
    (
        "身体运动智能",
        &[
            "身体协调性需要加强，可多进行体育锻炼",
            "运动技能需要练习，建议参与更多体育活动",
            "体能素质有待提高，需要坚持日常锻炼",
        ],
    ),
    (
        "内省智能",
        &[
            "自我认知需要加强，建议多进行反思总结",
            "情绪管理能力有待提升，可学习情绪调节方法",
            "独立思考能力需要培养，鼓励表达自己的想法",
        ],
    ),
];

const STRATEGY_TEMPLATES: &[(&str, &[&str])] = &[
    (
        "言语语言智能",
        &[
            "增加课外阅读，培养语感和理解能力",
            "多参与课堂讨论，提升口语表达能力",
            "坚持写作练习，记录生活感悟",
            "参加演讲比赛，锻炼公众表达能力",
        ],
    ),
    (
        "逻辑数理智能",
        &[
            "多做数学游戏，在趣味中提升逻辑思维",
            "练习口算和心算，提高计算准确性",
            "学习编程思维，培养逻辑推理能力",
            "参与数学竞赛，挑战更高难度题目",
        ],
    ),
    (
        "自然观察智能",
        &[
            "多参与科学实验，培养观察和探究能力",
            "进行自然观察日记，记录发现的规律",
            "参观科技馆和自然博物馆，拓展科学视野",
            "种植小植物，观察生长变化过程",
        ],
    ),
    (
        "视觉空间智能",
        &[
            "多进行美术创作，发挥想象力和创造力",
            "玩拼图和积木游戏，训练空间思维",
            "学习手工制作，提升动手实践能力",
            "参观美术馆和艺术展，提升艺术鉴赏力",
        ],
    ),
    (
        "身体运动智能",
        &[
            "坚持每日体育锻炼，提升身体素质",
            "学习新的运动技能，如游泳、球类等",
            "参与团体运动，培养合作精神",
            "练习身体协调性动作，如舞蹈、体操等",
        ],
    ),
    (
        "内省智能",
        &[
            "养成反思习惯，每日总结学习和生活",
            "学习情绪管理技巧，提升心理素质",
            "培养独立思考能力，勇于表达自己的观点",
            "参与志愿服务活动，培养社会责任感",
        ],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample_sheet() -> ScoreSheet {
        let subjects = vec![
            "语文测评".to_string(),
            "英语测评".to_string(),
            "数学口算".to_string(),
            "科学".to_string(),
            "体育跳绳".to_string(),
            "劳动".to_string(),
        ];
        let mut scores = HashMap::new();
        scores.insert("语文测评".to_string(), 5.0);
        scores.insert("英语测评".to_string(), 4.0);
        scores.insert("数学口算".to_string(), 5.0);
        scores.insert("科学".to_string(), 2.0);
        scores.insert("体育跳绳".to_string(), 3.0);
        scores.insert("劳动".to_string(), 1.0);
        ScoreSheet {
            subjects,
            rows: vec![ScoreRow {
                class: "一年级1班".to_string(),
                name: "张小明".to_string(),
                scores,
            }],
        }
    }

    #[test]
    fn intelligence_scores_average_matched_columns() {
        let sheet = sample_sheet();
        let scores = intelligence_scores(&sheet, &sheet.rows[0]);

        let by_name: HashMap<&str, f64> =
            scores.iter().map(|(name, score)| (name.as_str(), *score)).collect();
        assert_eq!(by_name["言语语言智能"], 4.5);
        assert_eq!(by_name["逻辑数理智能"], 5.0);
        assert_eq!(by_name["自然观察智能"], 2.0);
        // no 科创/美术 column in the sheet
        assert_eq!(by_name["视觉空间智能"], 0.0);
        assert_eq!(by_name["身体运动智能"], 3.0);
        assert_eq!(by_name["内省智能"], 1.0);
    }

    #[test]
    fn analyze_picks_top_two_and_below_mean_bottom_two() {
        let sheet = sample_sheet();
        let scores = intelligence_scores(&sheet, &sheet.rows[0]);
        let (strengths, weaknesses) = analyze(&scores);

        assert_eq!(strengths, vec!["逻辑数理智能", "言语语言智能"]);
        // mean ~2.58: below it sit 科学 2.0, 空间 0.0, 劳动 1.0 -> lowest two
        assert_eq!(weaknesses, vec!["内省智能", "视觉空间智能"]);
    }

    #[test]
    fn evaluation_text_joins_with_semicolons() {
        let mut rng = StdRng::seed_from_u64(1);
        let text = evaluation_text(
            &["言语语言智能".to_string(), "内省智能".to_string()],
            EvaluationKind::Strength,
            &mut rng,
        );
        assert!(text.contains("；"));
        assert!(text.ends_with("。"));

        let unknown = evaluation_text(&["不存在的智能".to_string()], EvaluationKind::Strategy, &mut rng);
        assert_eq!(unknown, "。");
    }

    #[test]
    fn statistics_cover_average_extremes_and_pass_rate() {
        let mut sheet = sample_sheet();
        let mut second = HashMap::new();
        second.insert("语文测评".to_string(), 2.0);
        sheet.rows.push(ScoreRow {
            class: "一年级1班".to_string(),
            name: "李小红".to_string(),
            scores: second,
        });

        let stats = subject_statistics(&sheet);
        let chinese = stats.iter().find(|s| s.subject == "语文测评").unwrap();
        assert_eq!(chinese.count, 2);
        assert_eq!(chinese.average, 3.5);
        assert_eq!(chinese.max, 5.0);
        assert_eq!(chinese.min, 2.0);
        assert_eq!(chinese.pass_rate, 50.0);
    }

    #[test]
    fn csv_round_trip_ignores_non_numeric_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.csv");
        std::fs::write(
            &path,
            "班级,姓名,语文,数学\n一年级1班,张小明,5,4\n一年级1班,李小红,缺考,3\n,,,\n",
        )
        .unwrap();

        let sheet = load_score_sheet(&path).unwrap();
        assert_eq!(sheet.subjects, vec!["语文", "数学"]);
        assert_eq!(sheet.rows.len(), 2);
        assert!(sheet.rows[1].scores.get("语文").is_none());
        assert_eq!(sheet.rows[1].scores["数学"], 3.0);
    }

    #[test]
    fn profiles_come_back_for_every_row() {
        let sheet = sample_sheet();
        let profiles = profile_sheet(&sheet);
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].name, "张小明");
        assert_eq!(profiles[0].scores.len(), INTELLIGENCE_MAPPING.len());
        assert_eq!(profiles[0].strengths.len(), 2);
    }
}
