use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// category -> tag -> template texts
pub type TemplateTable = BTreeMap<String, BTreeMap<String, Vec<String>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSelectionRange {
    pub min: usize,
    pub max: usize,
}

/// Comment template library: strength wording, improvement wording,
/// connector phrases, closing sentences, and the tag-count range drawn per
/// comment. Serializes to JSON so a customized library written next to the
/// roster files overrides the built-in corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateLibrary {
    pub positive: TemplateTable,
    pub improvement: TemplateTable,
    pub connectors: Vec<String>,
    pub closings: Vec<String>,
    pub tag_selection_range: TagSelectionRange,
}

impl TemplateLibrary {
    /// A tag counts as positive when any category of the strength table
    /// carries it. Unknown tags fall through to the improvement side.
    pub fn is_positive(&self, tag: &str) -> bool {
        self.positive.values().any(|category| category.contains_key(tag))
    }

    /// Picks one random template for the tag, scanning every category of
    /// the relevant table. A miss returns `None` and the caller drops the
    /// tag from assembly.
    pub fn template_for(&self, tag: &str, positive: bool, rng: &mut impl Rng) -> Option<String> {
        let table = if positive { &self.positive } else { &self.improvement };
        for category in table.values() {
            if let Some(templates) = category.get(tag) {
                if !templates.is_empty() {
                    return templates.choose(rng).cloned();
                }
            }
        }
        None
    }

    /// The whole strength corpus flattened, for the default-comment path.
    pub fn all_positive_templates(&self) -> Vec<String> {
        flatten(&self.positive)
    }

    pub fn all_improvement_templates(&self) -> Vec<String> {
        flatten(&self.improvement)
    }

    pub fn random_connector(&self, rng: &mut impl Rng) -> String {
        self.connectors.choose(rng).cloned().unwrap_or_default()
    }

    pub fn random_closing(&self, rng: &mut impl Rng) -> String {
        self.closings.choose(rng).cloned().unwrap_or_default()
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read template library {}", path.display()))?;
        let library = serde_json::from_str(&raw)
            .with_context(|| format!("invalid template library {}", path.display()))?;
        Ok(library)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw)
            .with_context(|| format!("failed to write template library {}", path.display()))?;
        Ok(())
    }

    /// Loads a customized library when one exists, otherwise the built-in
    /// corpus. A present-but-broken file is an error rather than a silent
    /// fallback.
    pub fn load_or_builtin(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::builtin())
        }
    }

    pub fn builtin() -> Self {
        TemplateLibrary {
            positive: builtin_positive(),
            improvement: builtin_improvement(),
            connectors: ["并且", "同时", "而且", "另外", "还有"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            closings: [
                "希望你能继续保持这份努力和进取心，勇敢地迎接每一个新的挑战，在克服困难中实现自我成长",
                "老师对你充满信心，只要你能在未来的学习中不断改进、勤奋钻研、积极思考，你一定能成长为一名品学兼优的优秀学生",
                "相信你会在新的学期里有更出色的表现，无论是学习成绩还是综合素质都会得到全面的提升和发展",
                "期待你在今后的学习中取得更大的进步，不仅在知识的积累上更上一层楼，也能在能力的培养方面有质的飞跃",
                "老师相信你会越来越优秀，在德智体美劳各个方面都能展现出你独特的光芒，成为一个全面发展的好学生",
                "希望你能继续发扬刻苦学习的精神，以积极向上的态度面对每一天，相信通过你的努力一定会收获丰硕的成果",
                "老师期待看到你在新学期里继续进步，用勤奋和智慧开创属于自己的精彩人生",
                "愿你保持这份学习的热情和动力，在知识的海洋中不断探索，让自己的未来更加光明",
                "相信通过你的不懈努力，一定能够实现自己的目标，成为一个品德优秀、学识渊博的人",
                "希望你继续保持良好的学习习惯，以积极乐观的心态面对挑战，在成长的道路上越走越远",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            tag_selection_range: TagSelectionRange { min: 2, max: 3 },
        }
    }
}

fn flatten(table: &TemplateTable) -> Vec<String> {
    table
        .values()
        .flat_map(|category| category.values())
        .flatten()
        .cloned()
        .collect()
}

fn category(entries: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
    entries
        .iter()
        .map(|(tag, templates)| {
            (
                tag.to_string(),
                templates.iter().map(|s| s.to_string()).collect(),
            )
        })
        .collect()
}

fn builtin_positive() -> TemplateTable {
    let mut table = TemplateTable::new();
    table.insert(
        "characteristics".to_string(),
        category(&[
            (
                "活泼开朗",
                &[
                    "你总是那么阳光开朗，是我们班级中宝贵的财富。你的笑容像春天的阳光一样温暖，给教室带来了无限的活力和朝气",
                    "你的活泼开朗感染着身边的每个人，让班级的氛围变得更加轻松愉快。你就像一束温暖的阳光，照亮了我们的教室",
                    "你的开朗性格为班级带来了很多欢声笑语，让每一天的学习生活都充满了快乐。你的乐观态度总能带动周围同学的情绪",
                    "你阳光的气质和开朗的性格让人印象深刻，无论是在课堂上还是课间活动中，你都能带给大家满满的正能量",
                    "你总是笑眯眯的样子真可爱，每次看到你开心的笑容，老师的心情也变得特别好。你就像一颗小太阳，把快乐的光芒洒向每一个角落",
                    "你活泼可爱的样子给班级带来了很多欢乐，同学们都喜欢和你一起玩耍，一起学习。你开朗的性格让班级的每一天都充满了欢声笑语",
                ],
            ),
            (
                "文静内向",
                &[
                    "你文静的性格让人感到温暖，就像一杯清茶，平淡中透露着独特的韵味。你的安静不是封闭，而是一种内在的沉稳",
                    "你的内敛中透露着深度和思考，总能在适当的时候提出独到的见解。你的发言虽然不多，但每次都很有价值",
                    "你安静的外表下有着丰富的内心世界，就像一本值得细细品读的好书，让人越了解越觉得有趣",
                    "你安安静静的样子特别让人喜欢，虽然话不多，但总是认真听讲，专注学习。你就像教室里一朵安静绽放的小花，默默散发着淡淡的芬芳",
                    "你文静的性格中藏着许多小惊喜，每次和你聊天都能发现你有趣的想法。你的内向不是缺点，而是一种特别的魅力",
                ],
            ),
            (
                "乐于助人",
                &[
                    "你总是那么热心肠，帮助同学时的样子真让老师骄傲。无论是在学习上还是生活中，你都能及时发现他人的需要并伸出援手",
                    "你乐于助人的品质让同学们都很喜欢你，你就像班级里的一束温暖的光，总能在同学需要帮助时及时出现",
                    "看到你主动帮助同学，老师感到很欣慰。你不仅仅是在帮助他人，更是在用实际行动传递着正能量",
                    "你的热心帮助让班级更加温暖，你总是能在同学遇到困难时伸出援手，展现出了真挚的同学情谊",
                    "你总是主动帮同学收拾书包和整理课桌，这份热心让老师很感动。你细心地帮助每一个需要帮助的同学，是班级里的小天使",
                    "看到同学遇到困难，你总是第一个伸出援手。不管是帮忙找丢失的文具，还是解答难懂的题目，你都会耐心地帮助他们",
                ],
            ),
            (
                "富有创造力",
                &[
                    "你富有创造力，总能想出新奇的点子。你的想象力就像一个取之不尽的宝库，经常能给大家带来惊喜",
                    "你的创新思维让老师眼前一亮，无论是在课堂讨论还是课外活动中，你总能提出独特而有价值的见解",
                    "你独特的创造力是你的宝贵财富，希望你能继续保持这种创新精神，让它在未来绽放出更加绚丽的光彩",
                    "你画的画总是充满想象力，每次看到都让人感到惊喜。你用丰富的色彩和独特的构思，把平凡的事物变得生动有趣",
                    "你做手工时总能想出新点子，做出的作品与众不同。你天马行空的想象力和灵巧的双手，总能创造出让人眼前一亮的作品",
                ],
            ),
            (
                "责任心强",
                &[
                    "你的责任心让老师很放心，无论是值日还是班级事务，你都能认真负责地完成每一项任务，展现出了优秀的品格",
                    "你对待每件事都很负责任，这种认真负责的态度值得大家学习。你就像班级里的定心丸，总能把事情做得妥妥帖帖",
                    "你强烈的责任感值得同学们学习，你用实际行动诠释了什么是一个优秀的班级成员应有的担当",
                    "你总是把值日任务做得干干净净的，是个让老师放心的好孩子。你认真打扫的教室，让我们每天都能在整洁的环境中学习",
                    "你每次被安排任务都会认真完成，从不马虎。不管是收发作业本，还是整理图书角，你都会用心做好每一个细节",
                ],
            ),
            (
                "团队合作能力强",
                &[
                    "你的团队合作能力很出色，在小组活动中总能很好地协调组员之间的关系，让团队工作有条不紊地进行",
                    "你总能很好地与同学们协作，既能提出建设性的意见，又能虚心接受他人的建议，是一个优秀的团队成员",
                    "你在团队活动中表现得非常棒，善于倾听他人的想法，也能贡献自己的智慧，让团队合作变得更加顺畅和高效",
                    "你在小组活动中很懂得照顾其他同学的感受，会耐心倾听每个人的想法，让大家都能开心地参与其中。你的团队精神让小组活动变得更有意义",
                    "你和同学们一起完成任务时总是很配合，既会主动承担工作，又懂得互相帮助。你的合作精神让团队活动变得更加顺利和愉快",
                ],
            ),
        ]),
    );
    table.insert(
        "discipline".to_string(),
        category(&[
            (
                "遵守纪律",
                &[
                    "你总是严格遵守各项纪律，无论是上课、自习还是课间活动，都能做到自觉遵守规则，展现出了优秀的自律品质",
                    "你的纪律意识值得表扬，即使没有老师监督，你也能自觉遵守班规校纪，是同学们学习的好榜样",
                    "你在纪律方面是同学们的好榜样，用实际行动展示了什么是真正的自律精神",
                ],
            ),
            (
                "行为规范",
                &[
                    "你的行为举止总是那么规范，举手投足间都透露着良好的教养，是一个懂得自我约束的好学生",
                    "你良好的行为习惯值得称赞，无论是在校园里还是校外活动中，都能保持应有的行为规范",
                    "你的表现一直很规范得体，展现出了优秀学生应有的素养和修养",
                ],
            ),
            (
                "尊敬师长",
                &[
                    "你对老师总是很尊敬，不仅仅表现在言语上的礼貌，更体现在对老师教导的认真对待和积极回应",
                    "你尊敬师长的品质很好，无论是在课堂上还是课下，都能以适当的礼节和恰当的态度与老师交流",
                    "你与老师的互动总是很有礼貌，展现出了良好的家教和个人修养，是同学们学习的好榜样",
                ],
            ),
            (
                "团结同学",
                &[
                    "你的团结意识让同学们心连心，共同创造美好班级。你就像一个润滑剂，总能化解同学之间的小摩擦",
                    "你与同学们相处得很融洽，既能在学习上互帮互助，也能在生活中互相关心，展现出了真挚的同学情谊",
                    "你总能团结身边的同学，用自己的行动营造温暖和谐的班级氛围，是班级团结友爱的典范",
                ],
            ),
            (
                "爱护公物",
                &[
                    "你总是很爱护班级的公共物品，对待每一件公共财物都像对待自己的东西一样珍惜，展现出了强烈的集体荣誉感",
                    "你爱护公物的习惯很好，不仅自己做到了爱护公物，还能及时制止他人损坏公物的行为",
                    "你对公共财物的爱护值得学习，这种责任感和集体意识让班级的环境变得更加整洁美好",
                ],
            ),
            (
                "文明礼貌",
                &[
                    "你的文明礼貌让人印象深刻，不仅对师长有礼，对同学也总是彬彬有礼，展现出了优秀的个人修养",
                    "你总是那么有礼貌，说话轻声细语，举止得体大方，是一个懂得尊重他人的好学生",
                    "你的礼貌用语让人感到温暖，这种文明礼貌的品质不仅提升了自己的形象，也为班级增添了文明的气息",
                ],
            ),
        ]),
    );
    table.insert(
        "academic".to_string(),
        category(&[
            (
                "语文成绩优秀",
                &[
                    "你的阅读水平高，常常能发现文章中隐藏的深意，对文章的理解和赏析能力都很出色。你的批判性思维和创造性思维让人印象深刻",
                    "你在语文学习上表现突出，理解能力很强，无论是阅读理解还是作文写作，都能展现出独特的见解和深刻的思考",
                    "你热爱读书，知识的海洋因你而更加璀璨。你的阅读量丰富，积累的词汇和素材让你的写作更加生动精彩",
                    "你的语文功底很扎实，不仅基础知识掌握得好，在写作和口语表达方面也有很强的能力",
                ],
            ),
            (
                "数学成绩优秀",
                &[
                    "你的数学思维很清晰，面对复杂的数学问题时总能抓住关键点，用简洁而巧妙的方法解决问题",
                    "你在数学学习上表现优异，不仅基础知识扎实，还能举一反三，善于发现数学规律和联系",
                    "你的逻辑思维能力很强，解题思路清晰明确，常常能找到独特的解题方法",
                    "你总能快速理解数学概念，并能灵活运用到实际问题中，展现出了优秀的数学思维能力",
                ],
            ),
            (
                "英语成绩优秀",
                &[
                    "你的英语水平令人赞叹，无论是听说读写，都展现出了全面的语言能力。你的口语表达流畅自然，词汇量丰富",
                    "你在英语学习上很有天赋，不仅语法基础扎实，还能准确地理解和运用各种英语表达方式",
                    "你的英语表达能力很出色，能够用地道的英语进行交流，展现出了优秀的语言天赋",
                ],
            ),
            (
                "理科成绩突出",
                &[
                    "你在理科学习上表现突出，对物理、化学等学科都有很深的理解。你善于观察和思考，常常能发现问题的本质",
                    "你的理科思维很敏捷，面对实验和计算题时总能沉着冷静，用科学的方法解决问题",
                    "你对理科知识的掌握很好，不仅理论基础扎实，还能在实验操作中展现出很强的动手能力",
                ],
            ),
            (
                "文科成绩突出",
                &[
                    "你的文科素养很高，在历史、地理等学科上都展现出了深厚的积累和独到的见解",
                    "你在文科学习上很有潜力，善于分析和理解复杂的社会现象，展现出了优秀的人文素养",
                    "你的文科成绩一直很突出，不仅知识面广，还能融会贯通，形成自己的观点",
                ],
            ),
            (
                "全面发展",
                &[
                    "你在各科学习上都表现均衡，展现出了全面发展的优秀品质。你的学习态度认真，方法科学",
                    "你是一个全面发展的好学生，不仅在文理科都有不错的成绩，还在艺术、体育等方面也有很好的表现",
                    "你各方面的表现都很出色，展现出了优秀学生应有的综合素质。你的学习方法值得同学们学习",
                ],
            ),
        ]),
    );
    table.insert(
        "homework".to_string(),
        category(&[
            (
                "按时完成作业",
                &[
                    "你总是能按时完成各项作业，这种自觉性和责任感让老师感到欣慰。你对待作业的认真态度值得表扬",
                    "你的作业完成情况很好，不仅准时交作业，而且质量也很高。你的学习态度让老师感到很欣慰",
                    "你从不拖拉作业，这个习惯很棒。你对待学习的认真态度和良好的时间管理能力值得同学们学习",
                ],
            ),
            (
                "作业质量优秀",
                &[
                    "你的作业质量总是很高，每一道题目都认真思考，每一个步骤都一丝不苟，展现出了对学习的严谨态度",
                    "你对作业的认真态度值得称赞，不仅内容准确完整，而且书写工整美观，是一个追求完美的好学生",
                    "你的作业完成得很出色，体现出了扎实的基础知识和灵活的思维能力，是同学们学习的好榜样",
                ],
            ),
            (
                "主动订正错误",
                &[
                    "你总是主动订正作业中的错误，并且认真分析错误原因，努力避免类似错误的发生。这种积极进取的学习态度很值得表扬",
                    "你对待错误的态度很端正，不仅会及时改正，还会举一反三，从错误中吸取经验教训",
                    "你能主动反思和改正，这很好。你对待错误的态度体现出了优秀学生应有的学习精神",
                ],
            ),
            (
                "书写工整",
                &[
                    "你的字如其人，一笔一划都透露出认真和细心。你工整的字迹不仅美观，更体现出了对学习的严谨态度",
                    "你的书写总是那么工整，每一个字都写得清清楚楚，体现出了你对学习的认真和专注",
                    "你优美的字迹让人赏心悦目，这不仅是一种书写能力，更是一种良好的学习习惯的体现",
                ],
            ),
            (
                "独立完成",
                &[
                    "你总是独立完成各项作业，这种自主学习的能力非常难得。你的独立思考能力让老师感到欣慰",
                    "你的独立学习能力很强，面对困难时总能自己动脑思考，展现出了优秀的学习品质",
                    "你能自主完成学习任务，这种独立自主的学习态度值得表扬。你的自学能力会让你受益终身",
                ],
            ),
            (
                "超额完成",
                &[
                    "你总是能超额完成学习任务，不满足于基本要求，总是力求更好。这种追求进步的精神很可贵",
                    "你的学习主动性很强，经常主动完成额外的练习题，展现出了对知识的渴望",
                    "你额外的努力值得表扬，这种积极进取的学习态度一定会让你在学习的道路上走得更远",
                ],
            ),
        ]),
    );
    table.insert(
        "physicalLabor".to_string(),
        category(&[
            (
                "体育成绩优秀",
                &[
                    "你的体育成绩一直很优秀，无论是在田径场上还是球场上，都展现出了出色的运动天赋和坚持不懈的精神",
                    "你在体育运动方面很有天赋，各项运动技能都掌握得很好，是同学们学习的好榜样",
                    "你的运动能力令人羡慕，这是你平时刻苦锻炼的结果。你积极参与体育活动的精神值得表扬",
                ],
            ),
            (
                "积极参与劳动",
                &[
                    "你总是积极参与各项劳动，不怕脏不怕累，用实际行动展现了新时代好少年的风采。你认真负责的劳动态度值得表扬",
                    "你的劳动态度很积极，总是主动承担劳动任务，并且认真完成每一项工作。你的表现让老师感到很欣慰",
                    "你在劳动中表现得很出色，不仅自己干得好，还能带动其他同学一起参与，展现出了良好的团队精神",
                ],
            ),
            (
                "身体素质好",
                &[
                    "你的身体素质很好，这是你坚持锻炼的成果。你积极参与体育活动的精神值得表扬",
                    "你有着健康的体魄，在各项体育活动中都能展现出充沛的体力和良好的运动能力",
                    "你的体能状况很棒，这与你平时注重锻炼是分不开的。希望你继续保持这种积极锻炼的好习惯",
                ],
            ),
            (
                "运动能力强",
                &[
                    "你的运动能力很强，无论是在球场上还是在田径场上，都能展现出优秀的运动天赋和过人的实力",
                    "你在各项运动中都表现出色，这与你平时刻苦训练是分不开的。你认真锻炼的精神值得表扬",
                    "你的体育天赋很突出，各项运动技能都掌握得很好，是同学们学习的好榜样",
                ],
            ),
            (
                "劳动积极主动",
                &[
                    "你在劳动中总是积极主动，不等不靠，主动发现需要做的事情。你的劳动意识和责任感值得表扬",
                    "你的劳动热情值得学习，总是能发现他人没注意到的细节，并主动完成。你的表现让老师感到欣慰",
                    "你主动承担劳动任务的精神很好，这种积极主动的态度不仅体现在劳动中，也反映在学习和生活的方方面面",
                ],
            ),
            (
                "体育精神佳",
                &[
                    "你具有良好的体育精神，在比赛中既能顽强拼搏，又能以平和的心态面对胜负。你的体育道德和竞技精神值得表扬",
                    "你在运动中展现出优秀的品格，不怕困难、勇于挑战，同时也懂得团队协作和互相鼓励",
                    "你的体育精神值得称赞，无论是在训练还是比赛中，都展现出了积极向上的精神面貌和良好的竞技道德",
                ],
            ),
        ]),
    );
    table
}

fn builtin_improvement() -> TemplateTable {
    let mut table = TemplateTable::new();
    table.insert(
        "characteristics".to_string(),
        category(&[
            (
                "过于内向",
                &[
                    "你在课堂和集体活动中比较安静，可以试着先从和身边的好朋友多聊天开始，慢慢培养与人交流的信心",
                    "老师发现你有很多有趣的想法，不过经常不好意思说出来。其实大家都很愿意听你分享，不妨从举手回答简单的问题开始尝试",
                    "你是个很有想法的孩子，可以多参加一些自己感兴趣的班级活动，比如朗诵、唱歌或者小组讨论，相信你会慢慢变得更开朗",
                ],
            ),
            (
                "注意力不集中",
                &[
                    "你在课堂上经常看窗外或者玩小物件，这样会错过老师讲的重要知识点。建议你把座位周围的小物件收起来，专心听讲",
                    "老师观察到你上课时思维经常跑偏，可以试着在课堂上记笔记或画重点，这样能帮助你更好地集中注意力",
                    "你偶尔会因为走神而听不清老师的问题，不妨试着坐直身体，眼睛看着老师，这样更容易集中精神",
                ],
            ),
            (
                "缺乏自信",
                &[
                    "你做事情总是特别担心做错，其实每个人都会犯错，重要的是从错误中学习。你已经进步很多了，要对自己更有信心",
                    "老师发现你明明会做的题目，却总是犹豫不决。不要害怕回答错误，大胆说出你的想法，这样才能不断进步",
                    "你有很多优点，比如认真负责、乐于助人，可是你常常不敢展示自己。试着多参与一些力所能及的活动，慢慢建立自信",
                ],
            ),
            (
                "不善表达",
                &[
                    "你的想法很好，但说出来时常常语言组织不够清晰。可以先在心里组织好语言，再慢慢表达，不用着急",
                    "老师看到你写的作文很有创意，建议你在课堂上也勇敢地说出自己的想法，多练习会让表达变得更流畅",
                    "你回答问题时声音比较小，而且有时词不达意。可以先和好朋友练习交流，慢慢提高表达能力",
                ],
            ),
            (
                "情绪波动大",
                &[
                    "你有时会因为一点小事就特别难过或生气，这样容易影响学习和交友。建议你学会深呼吸，慢慢平复心情",
                    "老师发现你心情不好时会影响到周围的同学，可以和老师或好朋友说说心里的想法，大家一起帮你解决困难",
                    "你遇到不顺心的事情时反应比较激烈，试着学会换个角度思考，或者做一些自己喜欢的事情来调节心情",
                ],
            ),
        ]),
    );
    table.insert(
        "discipline".to_string(),
        category(&[
            (
                "纪律松散",
                &[
                    "你经常在课堂上和同学聊天说笑，这样会影响到自己和他人的学习。让我们一起制定一个计划，每天进步一点点",
                    "你有时会在走廊上奔跑，或者大声喧哗，这样容易发生危险。记住要文明有序，保持安静",
                    "你偶尔会在早读时间看课外书或做其他事情，这样会打乱学习计划。建议按时间表来安排学习和休息",
                ],
            ),
            (
                "不遵守规则",
                &[
                    "你有时会不遵守课间活动的规则，这样会影响集体活动的开展。让我们一起回顾班级规则，理解它们的重要性",
                    "你偶尔会不排队，或者不遵守教室值日表，这会影响班级的秩序。记住遵守规则是对大家的负责",
                    "你在做游戏时常常不遵守规则，这样会让其他同学感到不开心。让我们一起学习理解和遵守规则的重要性",
                ],
            ),
            (
                "缺乏礼貌",
                &[
                    "你和老师同学说话时，有时会忘记说'请'、'谢谢'、'对不起'这些礼貌用语。让我们从现在开始培养良好的礼貌习惯",
                    "你偶尔会用不太友善的语气说话，这样会伤害到他人的感受。记住说话要温和有礼",
                    "你进出教室时有时会忘记敲门或者打招呼，这些小细节其实很重要。让我们一起养成文明礼貌的好习惯",
                ],
            ),
            (
                "影响课堂秩序",
                &[
                    "你在课堂上经常小声说话或者玩小动作，这样会影响到周围同学的学习。让我们一起创造一个安静的学习环境",
                    "你有时会在老师提问时随意插话，这样会打断课堂的节奏。记住要举手发言，遵守课堂纪律",
                    "你偶尔会因为坐不住而影响他人，建议你找到适合自己的专注方法，比如做笔记或者画重点",
                ],
            ),
            (
                "不团结同学",
                &[
                    "你在小组活动中有时不愿意和其他同学合作，独自行动。记住团结协作能让我们共同进步",
                    "你偶尔会和同学发生一些小矛盾，不愿意主动和解。其实宽容和理解能让大家成为更好的朋友",
                    "你有时会和某些同学玩得很好，却不愿意接纳其他同学。希望你能敞开心扉，和更多同学交朋友",
                ],
            ),
        ]),
    );
    table.insert(
        "academic".to_string(),
        category(&[
            (
                "语文成绩有待提升",
                &[
                    "你的语文基础知识掌握得还不够扎实，特别是在阅读理解方面需要加强。建议每天坚持读一篇好文章，慢慢提高理解能力",
                    "你的作文还停留在简单的记事上，可以多观察生活，积累一些好词好句，让文章更生动有趣",
                    "你在默写和背诵古诗文时还不够熟练，建议每天抽出一点时间复习，反复诵读",
                ],
            ),
            (
                "数学成绩有待提升",
                &[
                    "你在解应用题时常常抓不住重点，理解题意有困难。建议先画图或列表理清思路，再一步步解决",
                    "你的计算基本功还不够扎实，经常因为粗心出错。可以每天做一些基础练习，打好计算基础",
                    "你对数学公式的记忆和运用还不够熟练，建议多做一些类型题，加深理解和记忆",
                ],
            ),
            (
                "英语成绩有待提升",
                &[
                    "你的英语单词记忆还不够牢固，常常写错或读错。建议每天坚持记几个单词，多读多写多练",
                    "你在听力练习时还不能很好地理解对话内容。可以多听英语歌曲或看英语动画片，培养语感",
                    "你的口语表达还比较害羞，不敢开口。建议先从简单的日常对话开始练习，慢慢建立信心",
                ],
            ),
            (
                "理科成绩待提高",
                &[
                    "你对科学现象的观察还不够仔细，有时会忽略重要细节。建议做实验时认真记录每个步骤",
                    "你在理解一些科学原理时还有困难，可以通过做一些简单的小实验来加深理解",
                    "你对科学知识的联系还不够紧密，建议多思考生活中的科学现象，培养科学思维",
                ],
            ),
            (
                "文科成绩待提高",
                &[
                    "你对历史事件的记忆还不够系统，常常混淆时间顺序。可以试着画时间轴，理清历史发展脉络",
                    "你在理解地理知识时还有些困难，建议多看地图，把抽象的知识具体化",
                    "你的人文素养还需要提升，可以多读一些历史故事和地理知识读物，扩展视野",
                ],
            ),
            (
                "学习基础薄弱",
                &[
                    "你的知识储备还不够丰富，有些基础概念理解得不够清楚。建议从基础知识开始，一步一步打好基础",
                    "你的学习方法还不够科学，有时候会盲目地死记硬背。可以和老师同学交流，找到适合自己的学习方法",
                    "你对新知识的接受还比较慢，需要更多的练习和复习。建议制定详细的学习计划，循序渐进",
                ],
            ),
        ]),
    );
    table.insert(
        "homework".to_string(),
        category(&[
            (
                "作业拖拉",
                &[
                    "你经常拖到很晚才开始写作业，这样容易影响作业质量和休息。建议放学后先完成作业，再安排其他活动",
                    "你的作业经常没有按时完成，这样会影响第二天的学习。可以列一个任务清单，按顺序完成每项作业",
                    "你做作业时常常分心玩耍，导致时间拖得很长。建议先把玩具收起来，专心完成作业再玩",
                ],
            ),
            (
                "作业质量差",
                &[
                    "你的作业常常出现错别字或者计算错误，这说明做作业时不够认真。建议写完后检查一遍再交",
                    "你的作业有时会漏做题目或者做错题型，这样会影响知识的掌握。记得仔细阅读题目要求",
                    "你做作业时有时会抄袭他人，这样不利于自己的进步。要相信自己的能力，独立完成作业",
                ],
            ),
            (
                "经常忘记作业",
                &[
                    "你时常忘记带作业本或者忘记完成某项作业，这影响了你的学习进度。建议使用作业记录本，及时记录每天的作业",
                    "你对作业要求记得不够清楚，常常做错或者漏做。可以课后马上记录作业内容，有不明白的及时问老师",
                    "你有时会忘记带必要的学习用品，影响作业的完成。建议每天放学前检查第二天需要的物品",
                ],
            ),
            (
                "书写潦草",
                &[
                    "你的字迹比较潦草，有时连自己都看不清楚写的是什么。建议放慢速度，认真写好每一个字",
                    "你写字时坐姿不正确，导致字迹歪歪扭扭。记住要保持正确的坐姿和握笔姿势",
                    "你的作业本面貌不够整洁，有涂改和折角现象。试着保持本子的整洁，养成良好的书写习惯",
                ],
            ),
            (
                "依赖他人",
                &[
                    "你在做作业时经常问同学答案，或者抄袭他人作业。要学会独立思考，遇到困难可以先自己想办法解决",
                    "你遇到不会的题目就马上寻求他人帮助，没有经过自己的思考。建议先独立思考，实在不会再请教他人",
                    "你有时会依赖家长或同学完成作业，这样不利于能力的提升。要培养独立完成作业的好习惯",
                ],
            ),
            (
                "应付了事",
                &[
                    "你做作业时总是想快点完成，不够认真仔细。记住认真完成作业才能真正掌握知识",
                    "你的作业常常敷衍了事，只求完成不求质量。建议调整心态，认真对待每一项作业",
                    "你做作业时经常草草了事，这样会影响知识的巩固。试着以积极的态度对待作业，认真完成每一题",
                ],
            ),
        ]),
    );
    table.insert(
        "physicalLabor".to_string(),
        category(&[
            (
                "体育成绩待提高",
                &[
                    "你在体育课上显得有些力不从心，特别是在跑步项目上。建议每天坚持适度运动，慢慢提高体能",
                    "你对一些体育项目还不够熟练，需要更多的练习。可以找到自己喜欢的运动项目，坚持锻炼",
                    "你在体育活动中有时缺乏信心，其实运动是循序渐进的。从简单的运动开始，慢慢增加难度",
                ],
            ),
            (
                "劳动消极",
                &[
                    "你在劳动课上经常找借口逃避任务，这样不利于培养劳动意识。让我们一起感受劳动的快乐",
                    "你对劳动活动参与度不高，常常站在一旁看别人干。记住劳动能让我们学到很多技能",
                    "你在做值日时总是应付了事，没有认真完成。试着把劳动当作一种锻炼，认真对待每一项任务",
                ],
            ),
            (
                "身体素质待加强",
                &[
                    "你的身体素质还需要提升，容易感到疲劳。建议根据自己的情况制定适合的运动计划",
                    "你在运动时耐力不够，需要通过锻炼来增强体质。可以从每天坚持跑步开始，循序渐进",
                    "你的身体灵活性和协调性还需要提高。建议多参加一些趣味性的运动游戏，提高身体素质",
                ],
            ),
            (
                "运动能力有限",
                &[
                    "你在一些运动项目上还不够熟练，特别是球类运动。可以从简单的基本动作开始练习",
                    "你对某些运动项目还不够自信，其实每个人都有自己擅长的项目。多尝试不同的运动，找到适合自己的",
                    "你在运动时还不够协调，需要多加练习。建议每天抽时间做一些基础的运动，提高运动能力",
                ],
            ),
            (
                "劳动不主动",
                &[
                    "你在劳动时总是等待别人安排，缺乏主动性。其实仔细观察周围，总能发现需要做的事情",
                    "你对集体劳动活动参与度不高，常常需要老师提醒。记住主动承担任务能培养责任感",
                    "你在值日和打扫卫生时比较被动，建议培养主动劳动的意识，从小事做起",
                ],
            ),
            (
                "缺乏锻炼",
                &[
                    "你平时很少参加体育活动，总是待在教室里。建议每天至少运动半小时，保持身体健康",
                    "你对体育锻炼缺乏兴趣，更喜欢静态活动。可以和同学一起运动，让锻炼变得更有趣",
                    "你的运动时间明显不足，这样对身体发育不利。试着培养运动习惯，让运动成为生活的一部分",
                ],
            ),
        ]),
    );
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn polarity_comes_from_the_strength_table() {
        let library = TemplateLibrary::builtin();
        assert!(library.is_positive("活泼开朗"));
        assert!(library.is_positive("体育精神佳"));
        assert!(!library.is_positive("作业拖拉"));
        assert!(!library.is_positive("从未见过的标签"));
    }

    #[test]
    fn every_builtin_tag_resolves_to_a_template() {
        let library = TemplateLibrary::builtin();
        let mut rng = StdRng::seed_from_u64(7);
        for category in library.positive.values() {
            for tag in category.keys() {
                assert!(library.template_for(tag, true, &mut rng).is_some());
            }
        }
        for category in library.improvement.values() {
            for tag in category.keys() {
                assert!(library.template_for(tag, false, &mut rng).is_some());
            }
        }
    }

    #[test]
    fn lookup_miss_returns_none() {
        let library = TemplateLibrary::builtin();
        let mut rng = StdRng::seed_from_u64(7);
        assert!(library.template_for("不存在的标签", true, &mut rng).is_none());
        assert!(library.template_for("活泼开朗", false, &mut rng).is_none());
    }

    #[test]
    fn flattened_corpus_spans_all_categories() {
        let library = TemplateLibrary::builtin();
        let positive = library.all_positive_templates();
        assert!(positive.len() > 50);
        assert!(positive.iter().any(|t| t.contains("阳光开朗")));
        assert!(positive.iter().any(|t| t.contains("体育精神")));
        let improvement = library.all_improvement_templates();
        assert!(improvement.iter().any(|t| t.contains("作业")));
    }

    #[test]
    fn json_round_trip_preserves_the_library() {
        let library = TemplateLibrary::builtin();
        let raw = serde_json::to_string(&library).unwrap();
        let back: TemplateLibrary = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.connectors, library.connectors);
        assert_eq!(back.closings.len(), 10);
        assert_eq!(back.tag_selection_range, TagSelectionRange { min: 2, max: 3 });
        assert_eq!(back.positive.len(), 5);
        assert_eq!(back.improvement.len(), 5);
    }

    #[test]
    fn load_or_builtin_falls_back_when_no_file_exists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("templates.json");
        let library = TemplateLibrary::load_or_builtin(&path).unwrap();
        assert_eq!(library.closings.len(), 10);

        library.save(&path).unwrap();
        let reloaded = TemplateLibrary::load_or_builtin(&path).unwrap();
        assert_eq!(reloaded.connectors, library.connectors);
    }
}
