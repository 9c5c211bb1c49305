//! Flattening of the CMDI header and the toolchain description into
//! document metadata.
//!
//! Nested metadata elements become colon-separated keys. Repeated siblings
//! are told apart by a running ordinal (`ResourceProxy1`, `ResourceProxy2`,
//! ...); toolchain parameters carry a second ordinal below their tool.

use super::dictionary::{Tag, attr};
use super::reader::Attributes;
use crate::graph::{Annotatable, LabelKind, annotate, append_meta};

const WST: &str = "WebServiceToolChain";
const GI: &str = "GeneralInfo";
/// Separator of multi-valued metadata fields.
pub const VALUE_SEPARATOR: &str = "; ";

#[derive(Clone, Debug, Default)]
pub struct MetadataFlattener {
    /// Ordinal of the current repeated sibling.
    n: u32,
    /// Ordinal of the current parameter within a tool.
    m: u32,
}

impl MetadataFlattener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a start tag. Returns false if `tag` is not a metadata element.
    pub fn start<T: Annotatable + ?Sized>(
        &mut self,
        doc: &mut T,
        tag: Tag,
        parent: Option<Tag>,
        attributes: &Attributes,
    ) -> bool {
        let general = |rest: &str| format!("{WST}:{GI}:{rest}");
        match tag {
            Tag::Cmd => set(doc, attr::CMD_VERSION, attributes.get(attr::CMD_VERSION)),
            Tag::ResourceProxyList
            | Tag::JournalFileProxyList
            | Tag::ResourceRelationList
            | Tag::IsPartOfList => self.n = 0,
            Tag::ResourceProxy | Tag::JournalFileProxy | Tag::ResourceRelation | Tag::IsPartOf => {
                self.n += 1
            }
            Tag::ResourceType => set(
                doc,
                &format!("ResourceProxy{}:ResourceType:{}", self.n, attr::MIMETYPE),
                attributes.get(attr::MIMETYPE),
            ),
            Tag::GeneralInfo => {
                self.n = 0;
                set(doc, &general(attr::COMPONENT_ID), attributes.get(attr::COMPONENT_ID));
            }
            Tag::Descriptions => {
                self.n = 0;
                set(doc, &general("Descriptions"), attributes.get(attr::COMPONENT_ID));
            }
            Tag::Description => {
                self.n += 1;
                for name in [attr::TYPE, attr::LANG] {
                    set(doc, &general(&format!("Description{}:{name}", self.n)), attributes.get(name));
                }
            }
            Tag::ResourceName | Tag::ResourceTitle => {
                self.n += 1;
                let key = general(&format!("{}{}:{}", tag.as_str(), self.n, attr::LANG));
                set(doc, &key, attributes.get(attr::LANG));
            }
            Tag::Version => set(doc, &general("Version:lang"), attributes.get(attr::LANG)),
            Tag::Location => set(
                doc,
                &general(&format!("Location:{}", attr::COMPONENT_ID)),
                attributes.get(attr::COMPONENT_ID),
            ),
            Tag::Address | Tag::Region | Tag::ContinentName => {
                let key = general(&format!("Location:{}:{}", tag.as_str(), attr::LANG));
                set(doc, &key, attributes.get(attr::LANG));
            }
            Tag::Country => set(
                doc,
                &general(&format!("Country:{}", attr::COMPONENT_ID)),
                attributes.get(attr::COMPONENT_ID),
            ),
            Tag::CountryName => set(
                doc,
                &general("Location:Country:CountryName:lang"),
                attributes.get(attr::LANG),
            ),
            Tag::Tags => {
                self.n = 0;
                set(
                    doc,
                    &general(&format!("Tags:{}", attr::COMPONENT_ID)),
                    attributes.get(attr::COMPONENT_ID),
                );
            }
            Tag::Tag if parent == Some(Tag::Tags) => {
                self.n += 1;
                set(doc, &general(&format!("tag{}:lang", self.n)), attributes.get(attr::LANG));
            }
            Tag::Toolchain => {
                self.n = 0;
                set(
                    doc,
                    &format!("{WST}:Toolchain:{}", attr::COMPONENT_ID),
                    attributes.get(attr::COMPONENT_ID),
                );
            }
            Tag::ToolInChain => {
                self.n += 1;
                self.m = 0;
                set(
                    doc,
                    &format!("{}:{}", self.tool(), attr::COMPONENT_ID),
                    attributes.get(attr::COMPONENT_ID),
                );
            }
            Tag::Parameter => {
                self.m += 1;
                for name in [attr::NAME, attr::VALUE] {
                    set(doc, &format!("{}:{name}", self.parameter()), attributes.get(name));
                }
            }
            Tag::MdCreator
            | Tag::MdCreationDate
            | Tag::MdSelfLink
            | Tag::MdProfile
            | Tag::MdCollectionDisplayName
            | Tag::ResourceRef
            | Tag::JournalFileRef
            | Tag::RelationType
            | Tag::Res1
            | Tag::Res2
            | Tag::ResourceClass
            | Tag::LifeCycleStatus
            | Tag::StartYear
            | Tag::CompletionYear
            | Tag::PublicationDate
            | Tag::LastUpdate
            | Tag::TimeCoverage
            | Tag::LegalOwner
            | Tag::Genre
            | Tag::CountryCoding
            | Tag::Pid
            | Tag::WebServiceToolChain => {}
            _ => return false,
        }
        true
    }

    /// Handle an end tag with the element's character data.
    pub fn end<T: Annotatable + ?Sized>(
        &mut self,
        doc: &mut T,
        tag: Tag,
        parent: Option<Tag>,
        text: &str,
    ) -> bool {
        let general = |rest: &str| format!("{WST}:{GI}:{rest}");
        let value = Some(text);
        match tag {
            Tag::MdCreator => append(doc, tag.as_str(), text),
            Tag::MdCreationDate | Tag::MdSelfLink | Tag::MdProfile | Tag::MdCollectionDisplayName => {
                set(doc, tag.as_str(), value)
            }
            Tag::ResourceType | Tag::ResourceRef => {
                set(doc, &format!("ResourceProxy{}:{}", self.n, tag.as_str()), value)
            }
            Tag::JournalFileRef => set(doc, &format!("JournalFileProxy{}", self.n), value),
            Tag::RelationType | Tag::Res1 | Tag::Res2 => {
                set(doc, &format!("ResourceRelation{}:{}", self.n, tag.as_str()), value)
            }
            Tag::IsPartOf => set(doc, &format!("IsPartOfList:IsPartOf{}", self.n), value),
            Tag::ResourceName | Tag::ResourceTitle | Tag::Description => {
                set(doc, &general(&format!("{}{}", tag.as_str(), self.n)), value)
            }
            Tag::ResourceClass | Tag::TimeCoverage | Tag::LegalOwner | Tag::Genre => {
                append(doc, &general(tag.as_str()), text)
            }
            Tag::Version
            | Tag::LifeCycleStatus
            | Tag::StartYear
            | Tag::CompletionYear
            | Tag::PublicationDate
            | Tag::LastUpdate => set(doc, &general(tag.as_str()), value),
            Tag::Address | Tag::Region | Tag::ContinentName => {
                append(doc, &general(&format!("Location:{}", tag.as_str())), text)
            }
            Tag::CountryName | Tag::CountryCoding => {
                append(doc, &general(&format!("Location:Country:{}", tag.as_str())), text)
            }
            Tag::Tag if parent == Some(Tag::Tags) => {
                set(doc, &general(&format!("tag{}", self.n)), value)
            }
            Tag::Pid => set(doc, &format!("{}:PID", self.tool()), value),
            Tag::Parameter => set(doc, &self.parameter(), value),
            _ => return false,
        }
        true
    }

    fn tool(&self) -> String {
        format!("{WST}:Toolchain:ToolInChain{}", self.n)
    }

    fn parameter(&self) -> String {
        format!("{}:Parameter{}", self.tool(), self.m)
    }
}

fn set<T: Annotatable + ?Sized>(doc: &mut T, key: &str, value: Option<&str>) {
    annotate(Some(doc), None, Some(key), value, false, LabelKind::Meta);
}

fn append<T: Annotatable + ?Sized>(doc: &mut T, key: &str, value: &str) {
    append_meta(Some(doc), key, value, VALUE_SEPARATOR);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Labels;

    /// Feed `(tag, attributes, text)` triples as start/end pairs under `parent`.
    fn flatten(elements: &[(Tag, &[(&str, &str)], &str)], parent: Option<Tag>) -> Labels {
        let mut labels = Labels::new();
        let mut flattener = MetadataFlattener::new();
        for (tag, attrs, text) in elements {
            let attrs: Attributes = attrs.iter().copied().collect();
            flattener.start(&mut labels, *tag, parent, &attrs);
            flattener.end(&mut labels, *tag, parent, text);
        }
        labels
    }

    #[test]
    fn test_creators_are_concatenated() {
        let labels = flatten(
            &[
                (Tag::MdCreator, &[], "Alice"),
                (Tag::MdCreator, &[], "Bob"),
                (Tag::MdSelfLink, &[], "hdl:1"),
            ],
            None,
        );
        assert_eq!(labels.meta("MdCreator"), Some("Alice; Bob"));
        assert_eq!(labels.meta("MdSelfLink"), Some("hdl:1"));
    }

    #[test]
    fn test_resource_proxies_are_numbered() {
        let mut labels = Labels::new();
        let mut f = MetadataFlattener::new();
        let none = Attributes::new();
        let mime: Attributes = [("mimetype", "text/tcf+xml")].into_iter().collect();

        f.start(&mut labels, Tag::ResourceProxyList, None, &none);
        for (kind, href) in [("Resource", "a.xml"), ("LandingPage", "b.html")] {
            f.start(&mut labels, Tag::ResourceProxy, None, &none);
            f.start(&mut labels, Tag::ResourceType, None, &mime);
            f.end(&mut labels, Tag::ResourceType, None, kind);
            f.start(&mut labels, Tag::ResourceRef, None, &none);
            f.end(&mut labels, Tag::ResourceRef, None, href);
        }

        assert_eq!(labels.meta("ResourceProxy1:ResourceType"), Some("Resource"));
        assert_eq!(labels.meta("ResourceProxy1:ResourceType:mimetype"), Some("text/tcf+xml"));
        assert_eq!(labels.meta("ResourceProxy2:ResourceRef"), Some("b.html"));
    }

    #[test]
    fn test_general_info() {
        let labels = flatten(
            &[
                (Tag::GeneralInfo, &[("ComponentId", "clarin.eu:cr1:c_1")], ""),
                (Tag::ResourceName, &[("lang", "en")], "Sample"),
                (Tag::ResourceClass, &[], "corpus"),
                (Tag::ResourceClass, &[], "text"),
                (Tag::Version, &[("lang", "en")], "1.0"),
                (Tag::Address, &[("lang", "de")], "Berlin"),
            ],
            None,
        );
        assert_eq!(labels.meta("WebServiceToolChain:GeneralInfo:ComponentId"), Some("clarin.eu:cr1:c_1"));
        assert_eq!(labels.meta("WebServiceToolChain:GeneralInfo:ResourceName1"), Some("Sample"));
        assert_eq!(labels.meta("WebServiceToolChain:GeneralInfo:ResourceName1:lang"), Some("en"));
        assert_eq!(labels.meta("WebServiceToolChain:GeneralInfo:ResourceClass"), Some("corpus; text"));
        assert_eq!(labels.meta("WebServiceToolChain:GeneralInfo:Version"), Some("1.0"));
        assert_eq!(labels.meta("WebServiceToolChain:GeneralInfo:Version:lang"), Some("en"));
        assert_eq!(labels.meta("WebServiceToolChain:GeneralInfo:Location:Address"), Some("Berlin"));
        assert_eq!(labels.meta("WebServiceToolChain:GeneralInfo:Location:Address:lang"), Some("de"));
    }

    #[test]
    fn test_tags_only_under_tags() {
        let mut labels = Labels::new();
        let mut f = MetadataFlattener::new();
        let lang: Attributes = [("lang", "en")].into_iter().collect();

        f.start(&mut labels, Tag::Tags, None, &Attributes::new());
        f.start(&mut labels, Tag::Tag, Some(Tag::Tags), &lang);
        f.end(&mut labels, Tag::Tag, Some(Tag::Tags), "news");
        // a part-of-speech tag is not metadata
        assert!(!f.start(&mut labels, Tag::Tag, Some(Tag::PosTags), &lang));
        assert!(!f.end(&mut labels, Tag::Tag, Some(Tag::PosTags), "NN"));

        assert_eq!(labels.meta("WebServiceToolChain:GeneralInfo:tag1"), Some("news"));
        assert_eq!(labels.meta("WebServiceToolChain:GeneralInfo:tag1:lang"), Some("en"));
        assert_eq!(labels.meta_annotations().count(), 2);
    }

    #[test]
    fn test_toolchain_parameters() {
        let mut labels = Labels::new();
        let mut f = MetadataFlattener::new();
        let none = Attributes::new();

        f.start(&mut labels, Tag::Toolchain, None, &[("ComponentId", "tc")].into_iter().collect());
        for tool in ["tok", "pos"] {
            f.start(&mut labels, Tag::ToolInChain, None, &none);
            f.start(&mut labels, Tag::Pid, None, &none);
            f.end(&mut labels, Tag::Pid, None, tool);
            for (name, value) in [("lang", "de"), ("model", tool)] {
                let attrs: Attributes = [("name", name), ("value", value)].into_iter().collect();
                f.start(&mut labels, Tag::Parameter, None, &attrs);
                f.end(&mut labels, Tag::Parameter, None, "");
            }
        }

        let tool2 = "WebServiceToolChain:Toolchain:ToolInChain2";
        assert_eq!(labels.meta("WebServiceToolChain:Toolchain:ComponentId"), Some("tc"));
        assert_eq!(labels.meta("WebServiceToolChain:Toolchain:ToolInChain1:PID"), Some("tok"));
        assert_eq!(labels.meta(&format!("{tool2}:Parameter2:name")), Some("model"));
        assert_eq!(labels.meta(&format!("{tool2}:Parameter2:value")), Some("pos"));
        assert_eq!(labels.meta(&format!("{tool2}:Parameter1")), None);
    }

    #[test]
    fn test_empty_values_are_not_written() {
        let labels = flatten(&[(Tag::MdProfile, &[], ""), (Tag::Cmd, &[], "")], None);
        assert!(labels.is_empty());
    }
}
