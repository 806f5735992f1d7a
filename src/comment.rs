use std::collections::BTreeMap;
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::{EvaluationTags, GeneratedComment, Student};
use crate::templates::TemplateLibrary;

/// Assembles natural-language comments from a student's evaluation tags.
/// All randomness flows through the caller's RNG so output is reproducible
/// under a fixed seed.
pub struct CommentGenerator<'a> {
    templates: &'a TemplateLibrary,
}

impl<'a> CommentGenerator<'a> {
    pub fn new(templates: &'a TemplateLibrary) -> Self {
        CommentGenerator { templates }
    }

    /// Generates one comment. An empty tag set falls back to the generic
    /// corpus-wide comment with `used_tags` left empty; it is never an
    /// error.
    pub fn generate(
        &self,
        name: &str,
        tags: &EvaluationTags,
        rng: &mut impl Rng,
    ) -> GeneratedComment {
        let all_tags = tags.all();
        if all_tags.is_empty() {
            return GeneratedComment {
                comment: self.default_comment(name, rng),
                used_tags: Vec::new(),
            };
        }

        let selected = self.select_random_tags(&all_tags, rng);
        GeneratedComment {
            comment: self.assemble(name, &selected, rng),
            used_tags: selected,
        }
    }

    /// Draws `k` distinct tags uniformly by shuffling a copy and slicing,
    /// with `k` from the configured inclusive range clamped to the number
    /// of available tags.
    fn select_random_tags(&self, tags: &[String], rng: &mut impl Rng) -> Vec<String> {
        let range = self.templates.tag_selection_range;
        let upper = range.max.max(range.min);
        let count = rng.gen_range(range.min..=upper).min(tags.len());
        let mut shuffled = tags.to_vec();
        shuffled.shuffle(rng);
        shuffled.truncate(count);
        shuffled
    }

    fn assemble(&self, name: &str, tags: &[String], rng: &mut impl Rng) -> String {
        let mut comment = format!("{name}同学\n");

        let (positive_tags, negative_tags): (Vec<&String>, Vec<&String>) =
            tags.iter().partition(|tag| self.templates.is_positive(tag.as_str()));

        let positive_texts: Vec<String> = positive_tags
            .iter()
            .filter_map(|tag| self.templates.template_for(tag.as_str(), true, rng))
            .collect();
        if let Some((first, rest)) = positive_texts.split_first() {
            comment.push_str(first);
            for text in rest {
                comment.push_str(&self.templates.random_connector(rng));
                comment.push_str(text);
            }
        }

        let negative_texts: Vec<String> = negative_tags
            .iter()
            .filter_map(|tag| self.templates.template_for(tag.as_str(), false, rng))
            .collect();
        if let Some((first, rest)) = negative_texts.split_first() {
            // Keyed off selected positive tags, not produced texts: a
            // positive tag whose template lookup missed still earns the
            // contrast prefix.
            if !positive_tags.is_empty() {
                comment.push_str("。但是");
            }
            comment.push_str(first);
            for text in rest {
                comment.push_str("，同时");
                comment.push_str(text);
            }
        }

        comment.push('。');
        comment.push_str(&self.templates.random_closing(rng));
        comment
    }

    /// Generic comment for students without tags: two distinct entries
    /// drawn from the whole strength corpus (deliberately not tag-scoped),
    /// one improvement sentence, the usual closing.
    pub fn default_comment(&self, name: &str, rng: &mut impl Rng) -> String {
        let mut positive = self.templates.all_positive_templates();
        let improvements = self.templates.all_improvement_templates();

        let mut comment = format!("{name}同学\n");

        positive.shuffle(rng);
        if let Some(first) = positive.first() {
            comment.push_str(first);
            if let Some(second) = positive.get(1) {
                comment.push_str(&self.templates.random_connector(rng));
                comment.push_str(second);
            }
        }

        if let Some(improvement) = improvements.choose(rng) {
            comment.push_str("。但是");
            comment.push_str(improvement);
        }

        comment.push('。');
        comment.push_str(&self.templates.random_closing(rng));
        comment
    }

    /// Sequentially generates a comment per student. `delay` paces the loop
    /// for an animated host UI and carries no correctness weight; pass
    /// `Duration::ZERO` to run flat out. `on_progress` fires after every
    /// student with completed counts 1..=N.
    pub async fn generate_batch<F>(
        &self,
        students: &[Student],
        delay: Duration,
        mut on_progress: F,
        rng: &mut impl Rng,
    ) -> BTreeMap<String, GeneratedComment>
    where
        F: FnMut(usize, usize),
    {
        let mut comments = BTreeMap::new();
        let total = students.len();

        for (index, student) in students.iter().enumerate() {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let generated = self.generate(&student.name, &student.evaluation_tags, rng);
            comments.insert(student.id.clone(), generated);
            on_progress(index + 1, total);
        }

        comments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::{TagSelectionRange, TemplateLibrary};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeMap as Map;

    fn tags_with(characteristics: &[&str], homework: &[&str]) -> EvaluationTags {
        EvaluationTags {
            characteristics: characteristics.iter().map(|s| s.to_string()).collect(),
            homework: homework.iter().map(|s| s.to_string()).collect(),
            ..EvaluationTags::default()
        }
    }

    fn ends_with_closing(library: &TemplateLibrary, comment: &str) -> bool {
        library.closings.iter().any(|c| comment.ends_with(c.as_str()))
    }

    #[test]
    fn tagged_comment_has_header_and_closing() {
        let library = TemplateLibrary::builtin();
        let generator = CommentGenerator::new(&library);
        let tags = tags_with(&["活泼开朗", "乐于助人"], &["按时完成作业"]);

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let result = generator.generate("张小明", &tags, &mut rng);
            assert!(result.comment.starts_with("张小明同学\n"));
            assert!(ends_with_closing(&library, &result.comment));
        }
    }

    #[test]
    fn empty_tags_fall_back_to_default_comment() {
        let library = TemplateLibrary::builtin();
        let generator = CommentGenerator::new(&library);
        let mut rng = StdRng::seed_from_u64(3);

        let result = generator.generate("李小红", &EvaluationTags::default(), &mut rng);
        assert!(result.used_tags.is_empty());
        assert!(result.comment.starts_with("李小红同学\n"));
        assert!(result.comment.contains("。但是"));
        assert!(ends_with_closing(&library, &result.comment));
    }

    #[test]
    fn tag_count_stays_in_the_clamped_range() {
        let library = TemplateLibrary::builtin();
        let generator = CommentGenerator::new(&library);
        let five = tags_with(
            &["活泼开朗", "乐于助人", "责任心强"],
            &["按时完成作业", "书写工整"],
        );

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let result = generator.generate("王小华", &five, &mut rng);
            assert!(result.used_tags.len() >= 2 && result.used_tags.len() <= 3);
        }
    }

    #[test]
    fn single_tag_is_clamped_to_one_and_quoted_verbatim() {
        let library = TemplateLibrary::builtin();
        let generator = CommentGenerator::new(&library);
        let tags = tags_with(&["活泼开朗"], &[]);
        let expected = &library.positive["characteristics"]["活泼开朗"];

        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let result = generator.generate("陈小美", &tags, &mut rng);
            assert_eq!(result.used_tags, vec!["活泼开朗".to_string()]);
            assert!(expected.iter().any(|t| result.comment.contains(t.as_str())));
        }
    }

    #[test]
    fn mixed_tags_get_the_contrast_prefix() {
        let library = TemplateLibrary::builtin();
        let generator = CommentGenerator::new(&library);
        let tags = tags_with(&["活泼开朗"], &["作业拖拉"]);

        let mut rng = StdRng::seed_from_u64(11);
        let result = generator.generate("刘小强", &tags, &mut rng);
        assert_eq!(result.used_tags.len(), 2);
        assert!(result.comment.contains("。但是"));
    }

    #[test]
    fn negative_only_tags_skip_the_contrast_prefix() {
        let library = TemplateLibrary::builtin();
        let generator = CommentGenerator::new(&library);
        let tags = tags_with(&[], &["作业拖拉", "书写潦草"]);

        let mut rng = StdRng::seed_from_u64(5);
        let result = generator.generate("赵小刚", &tags, &mut rng);
        assert!(!result.comment.contains("。但是"));
        assert!(result.comment.contains("，同时"));
    }

    #[test]
    fn templateless_positive_tag_still_earns_the_prefix() {
        let mut library = TemplateLibrary::builtin();
        let mut bare: Map<String, Vec<String>> = Map::new();
        bare.insert("只有标签没有模板".to_string(), Vec::new());
        library.positive.insert("custom".to_string(), bare);
        library.tag_selection_range = TagSelectionRange { min: 2, max: 2 };

        let generator = CommentGenerator::new(&library);
        let tags = tags_with(&["只有标签没有模板"], &["作业拖拉"]);

        let mut rng = StdRng::seed_from_u64(9);
        let result = generator.generate("孙小丽", &tags, &mut rng);
        assert!(result.comment.contains("。但是"));
    }

    #[tokio::test]
    async fn batch_covers_every_student_and_reports_progress() {
        let library = TemplateLibrary::builtin();
        let generator = CommentGenerator::new(&library);
        let students: Vec<Student> = (1..=3)
            .map(|n| Student {
                id: format!("id-{n}"),
                name: format!("学生{n}"),
                evaluation_tags: EvaluationTags::default(),
            })
            .collect();

        let mut progress = Vec::new();
        let mut rng = StdRng::seed_from_u64(42);
        let comments = generator
            .generate_batch(
                &students,
                Duration::ZERO,
                |completed, total| progress.push((completed, total)),
                &mut rng,
            )
            .await;

        assert_eq!(comments.len(), 3);
        for student in &students {
            assert!(comments.contains_key(&student.id));
        }
        assert_eq!(progress, vec![(1, 3), (2, 3), (3, 3)]);
    }
}
