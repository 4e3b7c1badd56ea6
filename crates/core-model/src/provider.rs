use crate::ResourceId;
use core_config::Config;
use core_text::Eol;

/// Source of the default EOL for newly created models.
pub trait EolProvider {
    fn eol(&self, resource: Option<&ResourceId>, language_id: Option<&str>) -> Eol;
}

/// Same EOL for every resource and language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedEol(pub Eol);

impl Default for FixedEol {
    fn default() -> Self {
        Self(Eol::platform_default())
    }
}

impl EolProvider for FixedEol {
    fn eol(&self, _resource: Option<&ResourceId>, _language_id: Option<&str>) -> Eol {
        self.0
    }
}

/// Path-scoped lookup; non-`file://` resources only see the global `[files]` table.
impl EolProvider for Config {
    fn eol(&self, resource: Option<&ResourceId>, language_id: Option<&str>) -> Eol {
        self.resolve_eol(resource.and_then(ResourceId::file_path), language_id)
    }
}

impl<P: EolProvider + ?Sized> EolProvider for &P {
    fn eol(&self, resource: Option<&ResourceId>, language_id: Option<&str>) -> Eol {
        (**self).eol(resource, language_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_scopes_by_file_path_only() {
        let cfg = Config::from_toml_str(
            "[files]\neol = \"\\n\"\n\n[[files.scope]]\nroot = \"/myroot\"\neol = \"\\r\\n\"\n",
        )
        .unwrap();
        let inside = ResourceId::new("file:///myroot/myfile.txt");
        let outside = ResourceId::new("file:///other/myfile.txt");
        let untitled = ResourceId::new("untitled:/myroot/myfile.txt");
        assert_eq!(cfg.eol(Some(&inside), None), Eol::Crlf);
        assert_eq!(cfg.eol(Some(&outside), None), Eol::Lf);
        assert_eq!(cfg.eol(Some(&untitled), None), Eol::Lf);
        assert_eq!(cfg.eol(None, None), Eol::Lf);
    }

    #[test]
    fn fixed_ignores_arguments() {
        let p = FixedEol(Eol::Crlf);
        assert_eq!(p.eol(None, Some("rust")), Eol::Crlf);
        fn through<P: EolProvider>(provider: P) -> Eol {
            provider.eol(Some(&ResourceId::new("file:///x")), None)
        }
        assert_eq!(through(&p), Eol::Crlf);
    }
}
