//! Schema-driven interactive wizard
//!
//! Walks a `StepController` through its flow, prompting for every field of
//! the current step. A rejected submit re-prompts the same step with the
//! previous answers and the error messages shown next to each field.

use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Editor, Input, Select};
use miette::{IntoDiagnostic, Result};

use crate::core::step::{Stage, StepController};
use crate::schema::field::{FieldKind, FieldSchema, FieldSpec};
use crate::schema::validator::FormData;

/// Source of field answers
pub trait FieldPrompter {
    /// Ask for one field; `current` is the binder's value, `error` the last message
    fn prompt(&mut self, spec: &FieldSpec, current: Option<&str>, error: Option<&str>)
        -> Result<String>;

    /// Ask for a multiline text field; single-line prompt unless overridden
    fn prompt_text_area(
        &mut self,
        spec: &FieldSpec,
        current: Option<&str>,
        error: Option<&str>,
    ) -> Result<String> {
        self.prompt(spec, current, error)
    }

    /// Ask whether to start over once the result is shown
    fn confirm_restart(&mut self) -> Result<bool>;
}

/// Terminal prompter backed by dialoguer
pub struct DialoguerPrompter {
    theme: ColorfulTheme,
}

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for DialoguerPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldPrompter for DialoguerPrompter {
    fn prompt(
        &mut self,
        spec: &FieldSpec,
        current: Option<&str>,
        error: Option<&str>,
    ) -> Result<String> {
        if let Some(message) = error {
            println!("  {} {}", style("✗").red(), style(message).red());
        }

        let prompt = format_prompt(spec);

        match &spec.kind {
            FieldKind::Enum { values } => {
                let default_idx = current
                    .and_then(|c| values.iter().position(|v| v == c))
                    .unwrap_or(0);

                let selection = Select::with_theme(&self.theme)
                    .with_prompt(&prompt)
                    .items(values)
                    .default(default_idx)
                    .interact()
                    .into_diagnostic()?;

                Ok(values[selection].clone())
            }

            FieldKind::String { .. } => {
                let mut input = Input::<String>::with_theme(&self.theme)
                    .with_prompt(&prompt)
                    .allow_empty(true);

                if let Some(value) = current.filter(|c| !c.is_empty()) {
                    input = input.with_initial_text(value);
                }

                input.interact_text().into_diagnostic()
            }
        }
    }

    fn prompt_text_area(
        &mut self,
        spec: &FieldSpec,
        current: Option<&str>,
        error: Option<&str>,
    ) -> Result<String> {
        if let Some(message) = error {
            println!("  {} {}", style("✗").red(), style(message).red());
        }
        println!(
            "{} {} {}",
            style("?").yellow(),
            format_prompt(spec),
            style("(opens $EDITOR)").dim()
        );

        let current = current.unwrap_or_default();
        let edited = Editor::new()
            .extension(".txt")
            .edit(current)
            .into_diagnostic()?;

        // closing the editor without saving keeps the previous text
        Ok(match edited {
            Some(text) => text.trim_end_matches(['\r', '\n']).to_string(),
            None => current.to_string(),
        })
    }

    fn confirm_restart(&mut self) -> Result<bool> {
        Confirm::with_theme(&self.theme)
            .with_prompt("Restart?")
            .default(false)
            .interact()
            .into_diagnostic()
    }
}

/// Data collected by one completed pass through a flow
#[derive(Debug, Clone, PartialEq)]
pub struct WizardOutcome {
    pub data: FormData,
    /// Submits that failed validation along the way
    pub rejected_submits: usize,
}

/// A schema-driven wizard for filling in flows
pub struct SchemaWizard<P: FieldPrompter> {
    prompter: P,
    quiet: bool,
    show_watch: bool,
}

impl<P: FieldPrompter> SchemaWizard<P> {
    pub fn new(prompter: P) -> Self {
        Self {
            prompter,
            quiet: false,
            show_watch: false,
        }
    }

    /// Suppress headings and status lines
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Print the current values whenever a step is rejected
    pub fn show_watch(mut self, show: bool) -> Self {
        self.show_watch = show;
        self
    }

    pub fn into_prompter(self) -> P {
        self.prompter
    }

    /// Fill every remaining step until the controller reaches the result
    pub fn run(&mut self, controller: &mut StepController) -> Result<WizardOutcome> {
        let total = controller.flow().step_count();

        if !self.quiet {
            println!();
            println!(
                "{} {}",
                style("◆").cyan(),
                style(&controller.flow().title).bold()
            );
            println!("{}", style("─".repeat(50)).dim());
        }

        let mut rejected_submits = 0;

        while let Some(mut form) = controller.binder()? {
            let step = controller.state().current_step();

            if !self.quiet {
                let title = form.schema().title.clone().unwrap_or_default();
                println!();
                if total > 1 {
                    println!("{} Step {} of {} {}", style("→").blue(), step, total, style(title).bold());
                } else if !title.is_empty() {
                    println!("{} {}", style("→").blue(), style(title).bold());
                }
            }

            loop {
                let specs = form.schema().fields.clone();
                for spec in &specs {
                    let mut binding = form.register(&spec.name).into_diagnostic()?;
                    let answer = if spec.multiline && !spec.is_enum() {
                        self.prompter
                            .prompt_text_area(spec, binding.value(), binding.error())?
                    } else {
                        self.prompter
                            .prompt(spec, binding.value(), binding.error())?
                    };
                    binding.set(answer);
                }

                if !self.quiet {
                    println!(
                        "{} {}",
                        style("⏎").cyan(),
                        submit_caption(form.schema(), step == total)
                    );
                }

                match controller.submit(&mut form).into_diagnostic()? {
                    Some(_) => break,
                    None => {
                        rejected_submits += 1;
                        if !self.quiet {
                            println!(
                                "{} {} field(s) need attention",
                                style("!").yellow(),
                                form.errors().len()
                            );
                        }
                        if self.show_watch {
                            println!("{}", style(watch_line(&form.watch())).dim());
                        }
                    }
                }
            }
        }

        debug_assert_eq!(controller.stage(), Stage::Result);

        if !self.quiet {
            println!();
            println!("{} Values collected!", style("✓").green());
        }

        Ok(WizardOutcome {
            data: controller.accumulated().clone(),
            rejected_submits,
        })
    }

    /// Run the flow, hand each result to `on_result`, restart while the user asks
    ///
    /// Returns the number of completed passes.
    pub fn run_session<F>(
        &mut self,
        controller: &mut StepController,
        once: bool,
        mut on_result: F,
    ) -> Result<usize>
    where
        F: FnMut(&WizardOutcome) -> Result<()>,
    {
        let mut completed = 0;
        loop {
            let outcome = self.run(controller)?;
            completed += 1;
            on_result(&outcome)?;

            if once || !self.prompter.confirm_restart()? {
                return Ok(completed);
            }
            controller.restart().into_diagnostic()?;
        }
    }
}

/// Label of the submit action: the step's own label, else "Next" or "Submit"
fn submit_caption(schema: &FieldSchema, last_step: bool) -> String {
    match schema.submit_label.as_deref() {
        Some(label) => label.to_string(),
        None if last_step => "Submit".to_string(),
        None => "Next".to_string(),
    }
}

/// One-line dump of the values a rejected step was submitted with
fn watch_line(values: &FormData) -> String {
    format!("Watch: {}", serde_json::Value::Object(values.clone()))
}

/// Format the prompt for a field: label, placeholder and constraint hint
fn format_prompt(spec: &FieldSpec) -> String {
    let mut prompt = spec.display_label().to_string();

    if let Some(ref placeholder) = spec.placeholder {
        if placeholder != spec.display_label() {
            prompt.push_str(&format!(" ({})", style(placeholder).dim()));
        }
    }

    if let FieldKind::String {
        min_length,
        max_length,
        ..
    } = &spec.kind
    {
        let hint = match (min_length, max_length) {
            (Some(min), Some(max)) => Some(format!("{}-{} chars", min, max)),
            (Some(min), None) => Some(format!("min {} chars", min)),
            (None, Some(max)) => Some(format!("max {} chars", max)),
            (None, None) => None,
        };
        if let Some(hint) = hint {
            prompt.push_str(&format!(" [{}]", style(hint).dim()));
        }
    }

    if !spec.required {
        prompt.push_str(&format!(" {}", style("(optional)").dim()));
    }

    prompt
}
