const METRIC_LABELS: [(&str, &str); 7] = [
    ("loc", "LOC"),
    ("cc", "CC"),
    ("mi", "MI"),
    ("max_cc", "CC (Max)"),
    ("median_cc", "CC (Median)"),
    ("mi_min", "MI (Min)"),
    ("mi_median", "MI (Median)"),
];

/// Display label for a metric key; unknown keys are title-cased from
/// snake_case or camelCase.
pub fn format_metric_label(key: &str) -> String {
    if let Some((_, label)) = METRIC_LABELS.iter().find(|(known, _)| *known == key) {
        return (*label).to_owned();
    }

    let mut spaced = String::with_capacity(key.len() + 4);
    let mut previous: Option<char> = None;
    for ch in key.chars() {
        if ch.is_ascii_uppercase() && previous.is_some_and(|prev| prev.is_ascii_lowercase()) {
            spaced.push(' ');
        }
        spaced.push(if ch == '_' { ' ' } else { ch });
        previous = Some(ch);
    }

    let mut label = String::with_capacity(spaced.len());
    let mut at_word_start = true;
    for ch in spaced.chars() {
        let is_word = ch.is_alphanumeric();
        if is_word && at_word_start {
            label.extend(ch.to_uppercase());
        } else {
            label.push(ch);
        }
        at_word_start = !is_word;
    }
    label
}

/// `—` for metrics that were not computed, otherwise the plain number.
pub fn format_metric_value(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{value}"),
        None => "\u{2014}".to_owned(),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Segment {
    Text(&'static str),
    Strong(&'static str),
    Emphasis(&'static str),
    Code(&'static str),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Block {
    Paragraph(&'static [Segment]),
    Benchmarks(&'static [(&'static str, &'static str)]),
}

#[derive(Debug, PartialEq, Eq)]
pub struct MetricDescription {
    pub key: &'static str,
    pub title: &'static str,
    pub body: &'static [Block],
}

const CC_BENCHMARKS: &[(&str, &str)] = &[
    ("1\u{2013}5", "Good \u{2014} simple, easy to test"),
    ("6\u{2013}10", "Moderate \u{2014} still manageable"),
    ("11\u{2013}20", "Concerning \u{2014} hard to test thoroughly"),
    ("21+", "Bad \u{2014} should be refactored"),
];

const MI_BENCHMARKS: &[(&str, &str)] = &[
    ("> 85", "Highly maintainable"),
    ("65\u{2013}85", "Moderate"),
    ("< 65", "Low"),
];

const LOWER_IS_BETTER: Block = Block::Paragraph(&[Segment::Strong("Lower is better.")]);
const HIGHER_IS_BETTER: Block = Block::Paragraph(&[Segment::Strong("Higher is better.")]);

static DESCRIPTIONS: [MetricDescription; 7] = [
    MetricDescription {
        key: "loc",
        title: "LOC \u{2014} Lines of Code",
        body: &[
            Block::Paragraph(&[Segment::Text(
                "Count of non-empty, non-comment-only lines in the file. Lines with code followed by an inline comment are counted.",
            )]),
            Block::Paragraph(&[
                Segment::Strong("Lower is better."),
                Segment::Text(" Smaller files are easier to understand and maintain."),
            ]),
            Block::Benchmarks(&[
                ("1\u{2013}100", "Good \u{2014} small, easy to maintain"),
                ("100\u{2013}300", "Moderate \u{2014} consider if it does too much"),
                ("300\u{2013}500", "Concerning \u{2014} likely needs splitting"),
                ("500+", "Bad \u{2014} strong candidate for refactoring"),
            ]),
        ],
    },
    MetricDescription {
        key: "cc",
        title: "CC \u{2014} Cyclomatic Complexity",
        body: &[
            Block::Paragraph(&[
                Segment::Text(
                    "Number of independent code paths through a function. Starts at 1, then +1 for each ",
                ),
                Segment::Code("if"),
                Segment::Text(", "),
                Segment::Code("elif"),
                Segment::Text(", "),
                Segment::Code("while"),
                Segment::Text(", "),
                Segment::Code("for"),
                Segment::Text(", "),
                Segment::Code("match"),
                Segment::Text(" branch, "),
                Segment::Code("and"),
                Segment::Text("/"),
                Segment::Code("or"),
                Segment::Text(" operator, or ternary expression."),
            ]),
            Block::Paragraph(&[
                Segment::Strong("Lower is better."),
                Segment::Text(" Fewer paths = easier testing."),
            ]),
            Block::Benchmarks(CC_BENCHMARKS),
        ],
    },
    MetricDescription {
        key: "mi",
        title: "MI \u{2014} File-Level Maintainability Index",
        body: &[
            Block::Paragraph(&[
                Segment::Text("How hard is this file "),
                Segment::Emphasis("as a whole"),
                Segment::Text(
                    " to wrap your head around? A composite score (0\u{2013}171) combining size (LOC), complexity (CC), and information density (Halstead volume).",
                ),
            ]),
            Block::Paragraph(&[
                Segment::Strong("Formula:"),
                Segment::Text(" "),
                Segment::Code(
                    "MI = 171 \u{2212} 5.2\u{b7}ln(V) \u{2212} 0.23\u{b7}CC \u{2212} 16.2\u{b7}ln(LOC)",
                ),
            ]),
            Block::Paragraph(&[Segment::Text(
                "File-level MI is almost always lower than any individual function\u{2019}s MI, because it aggregates volume and LOC across the entire file. A file with 15 perfectly clean functions can still score low simply because there\u{2019}s a lot of code in total. Use MI (Min) and MI (Median) for a per-function perspective.",
            )]),
            HIGHER_IS_BETTER,
            Block::Benchmarks(MI_BENCHMARKS),
        ],
    },
    MetricDescription {
        key: "max_cc",
        title: "CC (Max) \u{2014} Maximum Cyclomatic Complexity",
        body: &[
            Block::Paragraph(&[Segment::Text(
                "The highest CC among all functions in the file. Identifies the single most complex function (the \u{201c}hotspot\u{201d}).",
            )]),
            Block::Paragraph(&[Segment::Text(
                "A file with CC (Max) = 15 means at least one function has 15 independent code paths.",
            )]),
            LOWER_IS_BETTER,
            Block::Benchmarks(CC_BENCHMARKS),
        ],
    },
    MetricDescription {
        key: "median_cc",
        title: "CC (Median) \u{2014} Median Cyclomatic Complexity",
        body: &[
            Block::Paragraph(&[
                Segment::Text("The median CC across all functions in the file. Represents the "),
                Segment::Emphasis("typical"),
                Segment::Text(" function complexity."),
            ]),
            Block::Paragraph(&[Segment::Text(
                "Unlike CC (Max), this is not skewed by one bad function. A value above 5 suggests most functions are moderately complex.",
            )]),
            LOWER_IS_BETTER,
            Block::Benchmarks(CC_BENCHMARKS),
        ],
    },
    MetricDescription {
        key: "mi_min",
        title: "MI (Min) \u{2014} Worst Per-Function MI",
        body: &[
            Block::Paragraph(&[
                Segment::Text("How bad is the worst individual function? The "),
                Segment::Emphasis("lowest"),
                Segment::Text(" MI among all functions in the file."),
            ]),
            Block::Paragraph(&[Segment::Text(
                "Because file-level MI aggregates across the whole file, it can look low even when every function is fine. MI (Min) cuts through that noise\u{2014}if this number is healthy, no single function is a problem.",
            )]),
            HIGHER_IS_BETTER,
            Block::Benchmarks(MI_BENCHMARKS),
        ],
    },
    MetricDescription {
        key: "mi_median",
        title: "MI (Median) \u{2014} Median Per-Function MI",
        body: &[
            Block::Paragraph(&[
                Segment::Text("How maintainable is the "),
                Segment::Emphasis("typical"),
                Segment::Text(" function? The median MI across all functions in the file."),
            ]),
            Block::Paragraph(&[Segment::Text(
                "If MI (Median) is high but MI (Min) is low, most functions are healthy and only one outlier needs attention. If both are low, the file has widespread maintainability issues.",
            )]),
            HIGHER_IS_BETTER,
            Block::Benchmarks(MI_BENCHMARKS),
        ],
    },
];

pub fn metric_description(key: &str) -> Option<&'static MetricDescription> {
    DESCRIPTIONS.iter().find(|description| description.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_keys_use_the_label_table() {
        assert_eq!(format_metric_label("loc"), "LOC");
        assert_eq!(format_metric_label("max_cc"), "CC (Max)");
        assert_eq!(format_metric_label("median_cc"), "CC (Median)");
        assert_eq!(format_metric_label("mi_min"), "MI (Min)");
        assert_eq!(format_metric_label("mi_median"), "MI (Median)");
    }

    #[test]
    fn unknown_keys_are_title_cased() {
        assert_eq!(format_metric_label("some_custom_metric"), "Some Custom Metric");
        assert_eq!(format_metric_label("someCustomMetric"), "Some Custom Metric");
        assert_eq!(format_metric_label("weight"), "Weight");
        assert_eq!(format_metric_label("Name"), "Name");
    }

    #[test]
    fn values_render_plain_numbers_or_a_dash() {
        assert_eq!(format_metric_value(Some(120.0)), "120");
        assert_eq!(format_metric_value(Some(71.25)), "71.25");
        assert_eq!(format_metric_value(None), "\u{2014}");
    }

    #[test]
    fn every_labelled_metric_has_a_description() {
        for (key, label) in METRIC_LABELS {
            let description = metric_description(key).unwrap();
            assert!(description.title.starts_with(label));
            assert!(!description.body.is_empty());
        }
        assert!(metric_description("churn").is_none());
    }
}
