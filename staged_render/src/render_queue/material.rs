/// Material attached to a material render queue.
///
/// Only the identity of the material matters to the pipeline: the template
/// (shader family), the stage queue it draws in, its compile-time macros
/// and whether it alpha-tests. Together they form the queue key
/// `stage@(AlphaTest|_)@macros@template`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Material {
    pub template: String,
    pub stage: String,
    pub macros: String,
    pub alpha_test: bool,
}

impl Material {
    pub fn new(template: &str, stage: &str, macros: &str, alpha_test: bool) -> Self {
        Self {
            template: template.to_string(),
            stage: stage.to_string(),
            macros: macros.to_string(),
            alpha_test,
        }
    }

    /// Name of the render queue drawing this material
    pub fn queue_key(&self) -> String {
        Self::key(&self.template, &self.stage, &self.macros, self.alpha_test)
    }

    pub(crate) fn key(template: &str, stage: &str, macros: &str, alpha_test: bool) -> String {
        let alpha = if alpha_test { "AlphaTest" } else { "_" };
        format!("{}@{}@{}@{}", stage, alpha, macros, template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_key_layout() {
        let opaque = Material::new("pbr", "Opaque", "SKINNED", false);
        let foliage = Material::new("leaf", "Opaque", "", true);

        assert_eq!(opaque.queue_key(), "Opaque@_@SKINNED@pbr");
        assert_eq!(foliage.queue_key(), "Opaque@AlphaTest@@leaf");
    }
}
