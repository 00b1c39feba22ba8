//! Card catalogs: validated step graphs.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::step::{StepContent, StepId};
use crate::error::ContentError;

/// Name substituted for `{recipient}` when none is configured.
pub const DEFAULT_RECIPIENT: &str = "My Love";

/// Name substituted for `{sender}` when none is configured.
pub const DEFAULT_SENDER: &str = "Your Valentine";

/// Names woven into a card's text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Personalization {
    /// Who the card is for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    /// Who the card is from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
}

impl Personalization {
    fn render(&self, text: &str) -> String {
        text.replace(
            "{recipient}",
            self.recipient.as_deref().unwrap_or(DEFAULT_RECIPIENT),
        )
        .replace("{sender}", self.sender.as_deref().unwrap_or(DEFAULT_SENDER))
    }
}

/// A card as authored, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardConfig {
    /// Card name, used in logs.
    pub name: String,
    /// The first step; also the target of every restart.
    pub initial: StepId,
    /// Names substituted into `{recipient}` / `{sender}` placeholders.
    #[serde(default)]
    pub personalization: Personalization,
    /// Steps in authoring order.
    pub steps: Vec<StepContent>,
}

/// A validated, personalised card.
///
/// Guarantees: the initial step exists, every action target exists, forward
/// edges form a path from the initial step that forks at most once (at the
/// single choice step) and never merges or loops, and every step is reachable.
#[derive(Debug, Clone)]
pub struct CardCatalog {
    name: String,
    initial: StepId,
    steps: Vec<StepContent>,
    index: HashMap<StepId, usize>,
    choice_step: Option<StepId>,
}

impl CardCatalog {
    /// Validates `config` and renders its placeholders.
    ///
    /// # Errors
    ///
    /// Returns the first `ContentError` describing why the steps do not form
    /// a valid narrative path.
    pub fn build(config: CardConfig) -> Result<Self, ContentError> {
        let CardConfig {
            name,
            initial,
            personalization,
            mut steps,
        } = config;

        if steps.is_empty() {
            return Err(ContentError::EmptyCatalog);
        }

        let mut index = HashMap::with_capacity(steps.len());
        for (position, step) in steps.iter().enumerate() {
            if index.insert(step.id.clone(), position).is_some() {
                return Err(ContentError::DuplicateStep(step.id.clone()));
            }
        }
        if !index.contains_key(&initial) {
            return Err(ContentError::UnknownInitial(initial));
        }

        let choice_step = validate_steps(&steps, &index)?;
        validate_path(&initial, &steps, &index)?;

        for step in &mut steps {
            for line in step.lines_mut() {
                line.text = personalization.render(&line.text);
            }
            for label in step.labels_mut() {
                *label = personalization.render(label);
            }
        }

        Ok(Self {
            name,
            initial,
            steps,
            index,
            choice_step,
        })
    }

    /// Card name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The first step.
    #[must_use]
    pub fn initial(&self) -> &StepId {
        &self.initial
    }

    /// Looks up a step's content.
    #[must_use]
    pub fn step(&self, id: &StepId) -> Option<&StepContent> {
        self.index.get(id).map(|position| &self.steps[*position])
    }

    /// Content of the initial step.
    #[must_use]
    pub fn initial_step(&self) -> &StepContent {
        &self.steps[self.index[&self.initial]]
    }

    /// All steps in authoring order.
    #[must_use]
    pub fn steps(&self) -> &[StepContent] {
        &self.steps
    }

    /// The branch point, if the card has one.
    #[must_use]
    pub fn choice_step(&self) -> Option<&StepId> {
        self.choice_step.as_ref()
    }

    /// True when `from → to` is an edge of the path graph, counting the
    /// restart edge from every terminal step back to the initial step.
    #[must_use]
    pub fn is_edge(&self, from: &StepId, to: &StepId) -> bool {
        self.step(from).is_some_and(|content| {
            if content.is_terminal() {
                *to == self.initial
            } else {
                content.actions.forward_edges().contains(&to)
            }
        })
    }

    /// SHA-256 over the rendered catalog, as lowercase hex.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        // Serialization of derived Serialize types to Vec<u8> is infallible.
        let canonical = serde_json::to_vec(&(&self.name, &self.initial, &self.steps))
            .expect("catalog serialization is infallible");
        format!("{:x}", Sha256::digest(&canonical))
    }
}

/// Per-step checks. Returns the choice step, if any.
fn validate_steps(
    steps: &[StepContent],
    index: &HashMap<StepId, usize>,
) -> Result<Option<StepId>, ContentError> {
    let mut choice_step: Option<StepId> = None;

    for step in steps {
        for element in step.elements() {
            let blank = step
                .line(element)
                .is_some_and(|line| line.text.trim().is_empty());
            if blank {
                return Err(ContentError::EmptyLine {
                    step: step.id.clone(),
                    element,
                });
            }
        }

        let edges = step.actions.forward_edges();
        for target in &edges {
            if !index.contains_key(*target) {
                return Err(ContentError::DanglingEdge {
                    from: step.id.clone(),
                    to: (*target).clone(),
                });
            }
        }

        if step.is_choice() {
            if edges[0] == edges[1] {
                return Err(ContentError::DegenerateChoice(step.id.clone()));
            }
            if let Some(first) = &choice_step {
                return Err(ContentError::MultipleChoices {
                    first: first.clone(),
                    second: step.id.clone(),
                });
            }
            choice_step = Some(step.id.clone());
        }
    }

    Ok(choice_step)
}

/// Graph checks: no merges, no loops, everything reachable.
fn validate_path(
    initial: &StepId,
    steps: &[StepContent],
    index: &HashMap<StepId, usize>,
) -> Result<(), ContentError> {
    let mut entered: HashSet<&StepId> = HashSet::new();
    for step in steps {
        for target in step.actions.forward_edges() {
            if !entered.insert(target) {
                return Err(ContentError::MergedPath(target.clone()));
            }
        }
    }

    let mut visited: HashSet<&StepId> = HashSet::new();
    let mut pending = vec![initial];
    while let Some(id) = pending.pop() {
        if !visited.insert(id) {
            return Err(ContentError::Cycle(id.clone()));
        }
        pending.extend(steps[index[id]].actions.forward_edges());
    }

    match steps.iter().find(|step| !visited.contains(&step.id)) {
        Some(orphan) => Err(ContentError::Unreachable(orphan.id.clone())),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::step::{ChoiceOption, Mood, RevealLine, StepActions, SubElement};

    fn continue_step(id: &str, next: &str) -> StepContent {
        StepContent {
            id: StepId::new(id),
            mood: Mood::Curious,
            headline: RevealLine::new(format!("{id} headline")),
            subtext: Some(RevealLine::new(format!("{id} subtext"))),
            line2: None,
            actions: StepActions::Continue {
                label: "Go on".to_owned(),
                next: StepId::new(next),
            },
        }
    }

    fn choice_step(id: &str, accept: &str, defer: &str) -> StepContent {
        StepContent {
            actions: StepActions::Choice {
                accept: ChoiceOption {
                    label: "Yes!".to_owned(),
                    next: StepId::new(accept),
                },
                defer: ChoiceOption {
                    label: "Not yet".to_owned(),
                    next: StepId::new(defer),
                },
            },
            ..continue_step(id, accept)
        }
    }

    fn ending(id: &str) -> StepContent {
        StepContent {
            actions: StepActions::Restart {
                label: "Start over?".to_owned(),
                celebrate: false,
            },
            ..continue_step(id, id)
        }
    }

    fn config(steps: Vec<StepContent>) -> CardConfig {
        CardConfig {
            name: "test".to_owned(),
            initial: StepId::new("intro"),
            personalization: Personalization::default(),
            steps,
        }
    }

    fn valid_steps() -> Vec<StepContent> {
        vec![
            continue_step("intro", "question"),
            choice_step("question", "accepted", "deferred"),
            ending("accepted"),
            ending("deferred"),
        ]
    }

    #[test]
    fn test_build_accepts_forked_path() {
        // Act
        let catalog = CardCatalog::build(config(valid_steps())).unwrap();

        // Assert
        assert_eq!(catalog.initial(), &StepId::new("intro"));
        assert_eq!(catalog.choice_step(), Some(&StepId::new("question")));
        assert_eq!(catalog.steps().len(), 4);
        assert_eq!(catalog.initial_step().id, StepId::new("intro"));
    }

    #[test]
    fn test_is_edge_covers_forward_branch_and_restart_edges() {
        let catalog = CardCatalog::build(config(valid_steps())).unwrap();
        let id = StepId::new;

        assert!(catalog.is_edge(&id("intro"), &id("question")));
        assert!(catalog.is_edge(&id("question"), &id("accepted")));
        assert!(catalog.is_edge(&id("question"), &id("deferred")));
        assert!(catalog.is_edge(&id("accepted"), &id("intro")));
        assert!(catalog.is_edge(&id("deferred"), &id("intro")));

        assert!(!catalog.is_edge(&id("intro"), &id("accepted")));
        assert!(!catalog.is_edge(&id("question"), &id("intro")));
        assert!(!catalog.is_edge(&id("accepted"), &id("deferred")));
        assert!(!catalog.is_edge(&id("missing"), &id("intro")));
    }

    #[test]
    fn test_build_rejects_empty_catalog() {
        let result = CardCatalog::build(config(Vec::new()));

        assert!(matches!(result, Err(ContentError::EmptyCatalog)));
    }

    #[test]
    fn test_build_rejects_duplicate_step() {
        let mut steps = valid_steps();
        steps.push(ending("accepted"));

        match CardCatalog::build(config(steps)).unwrap_err() {
            ContentError::DuplicateStep(id) => assert_eq!(id, StepId::new("accepted")),
            other => panic!("expected DuplicateStep, got {other:?}"),
        }
    }

    #[test]
    fn test_build_rejects_unknown_initial() {
        let mut card = config(valid_steps());
        card.initial = StepId::new("prologue");

        assert!(matches!(
            CardCatalog::build(card),
            Err(ContentError::UnknownInitial(_))
        ));
    }

    #[test]
    fn test_build_rejects_dangling_edge() {
        let steps = vec![continue_step("intro", "nowhere"), ending("accepted")];

        match CardCatalog::build(config(steps)).unwrap_err() {
            ContentError::DanglingEdge { from, to } => {
                assert_eq!(from, StepId::new("intro"));
                assert_eq!(to, StepId::new("nowhere"));
            }
            other => panic!("expected DanglingEdge, got {other:?}"),
        }
    }

    #[test]
    fn test_build_rejects_second_choice_step() {
        let steps = vec![
            continue_step("intro", "proposition"),
            choice_step("proposition", "reveal", "thinking"),
            choice_step("reveal", "yes", "later"),
            ending("thinking"),
            ending("yes"),
            ending("later"),
        ];

        match CardCatalog::build(config(steps)).unwrap_err() {
            ContentError::MultipleChoices { first, second } => {
                assert_eq!(first, StepId::new("proposition"));
                assert_eq!(second, StepId::new("reveal"));
            }
            other => panic!("expected MultipleChoices, got {other:?}"),
        }
    }

    #[test]
    fn test_build_rejects_choice_with_identical_targets() {
        let steps = vec![
            continue_step("intro", "question"),
            choice_step("question", "accepted", "accepted"),
            ending("accepted"),
        ];

        assert!(matches!(
            CardCatalog::build(config(steps)),
            Err(ContentError::DegenerateChoice(_))
        ));
    }

    #[test]
    fn test_build_rejects_merging_paths() {
        let steps = vec![
            continue_step("intro", "question"),
            choice_step("question", "accepted", "deferred"),
            continue_step("deferred", "accepted"),
            ending("accepted"),
        ];

        assert!(matches!(
            CardCatalog::build(config(steps)),
            Err(ContentError::MergedPath(id)) if id == StepId::new("accepted")
        ));
    }

    #[test]
    fn test_build_rejects_forward_loop_to_initial() {
        let steps = vec![
            continue_step("intro", "context"),
            continue_step("context", "intro"),
        ];

        assert!(matches!(
            CardCatalog::build(config(steps)),
            Err(ContentError::Cycle(id)) if id == StepId::new("intro")
        ));
    }

    #[test]
    fn test_build_rejects_unreachable_step() {
        let mut steps = valid_steps();
        steps.push(ending("epilogue"));

        assert!(matches!(
            CardCatalog::build(config(steps)),
            Err(ContentError::Unreachable(id)) if id == StepId::new("epilogue")
        ));
    }

    #[test]
    fn test_build_rejects_blank_line() {
        let mut steps = valid_steps();
        steps[0].subtext = Some(RevealLine::new("   "));

        match CardCatalog::build(config(steps)).unwrap_err() {
            ContentError::EmptyLine { step, element } => {
                assert_eq!(step, StepId::new("intro"));
                assert_eq!(element, SubElement::Subtext);
            }
            other => panic!("expected EmptyLine, got {other:?}"),
        }
    }

    #[test]
    fn test_build_renders_personalization_placeholders() {
        let mut steps = valid_steps();
        steps[0].headline = RevealLine::new("Hi {recipient}");
        steps[2].actions = StepActions::Restart {
            label: "Again, {recipient}?".to_owned(),
            celebrate: false,
        };
        steps[3].line2 = Some(RevealLine::new("Love, {sender}"));
        let mut card = config(steps);
        card.personalization.recipient = Some("Sam".to_owned());

        let catalog = CardCatalog::build(card).unwrap();

        assert_eq!(catalog.initial_step().headline.text, "Hi Sam");
        let accepted = catalog.step(&StepId::new("accepted")).unwrap();
        assert_eq!(accepted.actions.labels(), vec!["Again, Sam?"]);
        let deferred = catalog.step(&StepId::new("deferred")).unwrap();
        assert_eq!(
            deferred.line2.as_ref().unwrap().text,
            format!("Love, {DEFAULT_SENDER}")
        );
    }

    #[test]
    fn test_fingerprint_changes_with_content() {
        let plain = CardCatalog::build(config(valid_steps())).unwrap();
        let mut edited = valid_steps();
        edited[0].headline = RevealLine::new("A different opening");
        let edited = CardCatalog::build(config(edited)).unwrap();

        let hex = plain.fingerprint();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        assert_eq!(
            plain.fingerprint(),
            CardCatalog::build(config(valid_steps()))
                .unwrap()
                .fingerprint()
        );
        assert_ne!(plain.fingerprint(), edited.fingerprint());
    }
}
