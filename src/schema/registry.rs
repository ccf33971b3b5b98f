//! Flow registry - built-in flows plus user flow files

use std::path::Path;
use walkdir::WalkDir;

use crate::schema::flow::{FlowDefinition, FlowError};

/// Flow files embedded at compile time
const BUILTIN_FLOWS: &[(&str, &str)] = &[
    ("multistep.yaml", include_str!("../../flows/multistep.yaml")),
    ("single.yaml", include_str!("../../flows/single.yaml")),
];

/// Named collection of flow definitions
#[derive(Debug, Clone, Default)]
pub struct FlowRegistry {
    flows: Vec<FlowDefinition>,
}

impl FlowRegistry {
    /// Registry with no flows
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry holding the built-in flows; panics if an embedded flow file is invalid
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for (file, source) in BUILTIN_FLOWS {
            let flow = FlowDefinition::from_yaml(source, file)
                .unwrap_or_else(|e| panic!("built-in flow {} is invalid: {}", file, e));
            registry.insert(flow);
        }
        registry
    }

    /// Add a flow, replacing any flow with the same name
    pub fn insert(&mut self, flow: FlowDefinition) {
        match self.flows.iter_mut().find(|f| f.name == flow.name) {
            Some(existing) => *existing = flow,
            None => self.flows.push(flow),
        }
    }

    /// Load a single flow file and return its name
    pub fn load_file(&mut self, path: &Path) -> Result<String, FlowError> {
        let source = std::fs::read_to_string(path)?;
        let flow = FlowDefinition::from_yaml(&source, &path.display().to_string())?;
        let name = flow.name.clone();
        self.insert(flow);
        Ok(name)
    }

    /// Load every `*.yaml` / `*.yml` file directly inside `dir`
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, FlowError> {
        let mut loaded = 0;

        let mut paths: Vec<_> = WalkDir::new(dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| {
                p.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext == "yaml" || ext == "yml")
            })
            .collect();
        paths.sort();

        for path in paths {
            self.load_file(&path)?;
            loaded += 1;
        }

        Ok(loaded)
    }

    /// Look up a flow by name
    pub fn get(&self, name: &str) -> Result<&FlowDefinition, FlowError> {
        self.flows
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| FlowError::UnknownFlow {
                name: name.to_string(),
            })
    }

    pub fn has_flow(&self, name: &str) -> bool {
        self.flows.iter().any(|f| f.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlowDefinition> {
        self.flows.iter()
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}
