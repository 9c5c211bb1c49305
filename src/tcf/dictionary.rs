//! Element, attribute, layer and annotation names of the TCF format.

/// Known TCF and CMDI elements, matched by local name.
///
/// Everything not listed maps to [`Tag::Other`] and only takes part in path
/// tracking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
    // text corpus
    TextCorpus,
    Text,
    Token,
    Sentences,
    Sentence,
    Lemmas,
    Lemma,
    PosTags,
    Tag,
    Morphology,
    Analysis,
    F,
    Segment,
    Parsing,
    Parse,
    Constituent,
    DepParsing,
    Dependency,
    References,
    Entity,
    Reference,
    NamedEntities,
    Phonetics,
    Pron,
    Orthography,
    Correction,
    Geo,
    Src,
    GPoint,
    Synonymy,
    Antonymy,
    Hyponymy,
    Hyperonymy,
    Orthform,
    WordSenses,
    Ws,
    WordSplittings,
    Split,
    DiscourseConnectives,
    Connective,
    TextStructure,
    TextSpan,
    // CMDI header
    Cmd,
    MdCreator,
    MdCreationDate,
    MdSelfLink,
    MdProfile,
    MdCollectionDisplayName,
    ResourceProxyList,
    ResourceProxy,
    ResourceType,
    ResourceRef,
    JournalFileProxyList,
    JournalFileProxy,
    JournalFileRef,
    ResourceRelationList,
    ResourceRelation,
    RelationType,
    Res1,
    Res2,
    IsPartOfList,
    IsPartOf,
    // web service toolchain description
    WebServiceToolChain,
    GeneralInfo,
    Descriptions,
    Description,
    ResourceName,
    ResourceTitle,
    ResourceClass,
    Version,
    LifeCycleStatus,
    StartYear,
    CompletionYear,
    PublicationDate,
    LastUpdate,
    TimeCoverage,
    LegalOwner,
    Genre,
    Location,
    Address,
    Region,
    ContinentName,
    Country,
    CountryName,
    CountryCoding,
    Tags,
    Toolchain,
    ToolInChain,
    Pid,
    Parameter,
    Other,
}

impl Tag {
    /// Map a local element name (namespace prefix already stripped).
    pub fn from_local_name(name: &str) -> Tag {
        match name {
            "TextCorpus" => Tag::TextCorpus,
            "text" => Tag::Text,
            "token" => Tag::Token,
            "sentences" => Tag::Sentences,
            "sentence" => Tag::Sentence,
            "lemmas" => Tag::Lemmas,
            "lemma" => Tag::Lemma,
            "POStags" => Tag::PosTags,
            "tag" => Tag::Tag,
            "morphology" => Tag::Morphology,
            "analysis" => Tag::Analysis,
            "f" => Tag::F,
            "segment" => Tag::Segment,
            "parsing" => Tag::Parsing,
            "parse" => Tag::Parse,
            "constituent" => Tag::Constituent,
            "depparsing" => Tag::DepParsing,
            "dependency" => Tag::Dependency,
            "references" => Tag::References,
            "entity" => Tag::Entity,
            "reference" => Tag::Reference,
            "namedEntities" => Tag::NamedEntities,
            "Phonetics" | "phonetics" => Tag::Phonetics,
            "pron" => Tag::Pron,
            "orthography" => Tag::Orthography,
            "correction" => Tag::Correction,
            "geo" => Tag::Geo,
            "src" => Tag::Src,
            "gpoint" => Tag::GPoint,
            "synonymy" => Tag::Synonymy,
            "antonymy" => Tag::Antonymy,
            "hyponymy" => Tag::Hyponymy,
            "hyperonymy" => Tag::Hyperonymy,
            "orthform" => Tag::Orthform,
            "WordSenses" => Tag::WordSenses,
            "ws" => Tag::Ws,
            "WordSplittings" => Tag::WordSplittings,
            "split" => Tag::Split,
            "discourseconnectives" => Tag::DiscourseConnectives,
            "connective" => Tag::Connective,
            "textstructure" => Tag::TextStructure,
            "textspan" => Tag::TextSpan,
            "CMD" => Tag::Cmd,
            "MdCreator" => Tag::MdCreator,
            "MdCreationDate" => Tag::MdCreationDate,
            "MdSelfLink" => Tag::MdSelfLink,
            "MdProfile" => Tag::MdProfile,
            "MdCollectionDisplayName" => Tag::MdCollectionDisplayName,
            "ResourceProxyList" => Tag::ResourceProxyList,
            "ResourceProxy" => Tag::ResourceProxy,
            "ResourceType" => Tag::ResourceType,
            "ResourceRef" => Tag::ResourceRef,
            "JournalFileProxyList" => Tag::JournalFileProxyList,
            "JournalFileProxy" => Tag::JournalFileProxy,
            "JournalFileRef" => Tag::JournalFileRef,
            "ResourceRelationList" => Tag::ResourceRelationList,
            "ResourceRelation" => Tag::ResourceRelation,
            "RelationType" => Tag::RelationType,
            "Res1" => Tag::Res1,
            "Res2" => Tag::Res2,
            "IsPartOfList" => Tag::IsPartOfList,
            "IsPartOf" => Tag::IsPartOf,
            "WebServiceToolChain" => Tag::WebServiceToolChain,
            "GeneralInfo" => Tag::GeneralInfo,
            "Descriptions" => Tag::Descriptions,
            "Description" => Tag::Description,
            "ResourceName" => Tag::ResourceName,
            "ResourceTitle" => Tag::ResourceTitle,
            "ResourceClass" => Tag::ResourceClass,
            "Version" => Tag::Version,
            "LifeCycleStatus" => Tag::LifeCycleStatus,
            "StartYear" => Tag::StartYear,
            "CompletionYear" => Tag::CompletionYear,
            "PublicationDate" => Tag::PublicationDate,
            "LastUpdate" => Tag::LastUpdate,
            "TimeCoverage" => Tag::TimeCoverage,
            "LegalOwner" => Tag::LegalOwner,
            "Genre" => Tag::Genre,
            "Location" => Tag::Location,
            "Address" => Tag::Address,
            "Region" => Tag::Region,
            "ContinentName" => Tag::ContinentName,
            "Country" => Tag::Country,
            "CountryName" => Tag::CountryName,
            "CountryCoding" => Tag::CountryCoding,
            "Tags" => Tag::Tags,
            "Toolchain" => Tag::Toolchain,
            "ToolInChain" => Tag::ToolInChain,
            "PID" => Tag::Pid,
            "Parameter" => Tag::Parameter,
            _ => Tag::Other,
        }
    }

    /// Canonical element name, used in metadata keys and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Tag::TextCorpus => "TextCorpus",
            Tag::Text => "text",
            Tag::Token => "token",
            Tag::Sentences => "sentences",
            Tag::Sentence => "sentence",
            Tag::Lemmas => "lemmas",
            Tag::Lemma => "lemma",
            Tag::PosTags => "POStags",
            Tag::Tag => "tag",
            Tag::Morphology => "morphology",
            Tag::Analysis => "analysis",
            Tag::F => "f",
            Tag::Segment => "segment",
            Tag::Parsing => "parsing",
            Tag::Parse => "parse",
            Tag::Constituent => "constituent",
            Tag::DepParsing => "depparsing",
            Tag::Dependency => "dependency",
            Tag::References => "references",
            Tag::Entity => "entity",
            Tag::Reference => "reference",
            Tag::NamedEntities => "namedEntities",
            Tag::Phonetics => "Phonetics",
            Tag::Pron => "pron",
            Tag::Orthography => "orthography",
            Tag::Correction => "correction",
            Tag::Geo => "geo",
            Tag::Src => "src",
            Tag::GPoint => "gpoint",
            Tag::Synonymy => "synonymy",
            Tag::Antonymy => "antonymy",
            Tag::Hyponymy => "hyponymy",
            Tag::Hyperonymy => "hyperonymy",
            Tag::Orthform => "orthform",
            Tag::WordSenses => "WordSenses",
            Tag::Ws => "ws",
            Tag::WordSplittings => "WordSplittings",
            Tag::Split => "split",
            Tag::DiscourseConnectives => "discourseconnectives",
            Tag::Connective => "connective",
            Tag::TextStructure => "textstructure",
            Tag::TextSpan => "textspan",
            Tag::Cmd => "CMD",
            Tag::MdCreator => "MdCreator",
            Tag::MdCreationDate => "MdCreationDate",
            Tag::MdSelfLink => "MdSelfLink",
            Tag::MdProfile => "MdProfile",
            Tag::MdCollectionDisplayName => "MdCollectionDisplayName",
            Tag::ResourceProxyList => "ResourceProxyList",
            Tag::ResourceProxy => "ResourceProxy",
            Tag::ResourceType => "ResourceType",
            Tag::ResourceRef => "ResourceRef",
            Tag::JournalFileProxyList => "JournalFileProxyList",
            Tag::JournalFileProxy => "JournalFileProxy",
            Tag::JournalFileRef => "JournalFileRef",
            Tag::ResourceRelationList => "ResourceRelationList",
            Tag::ResourceRelation => "ResourceRelation",
            Tag::RelationType => "RelationType",
            Tag::Res1 => "Res1",
            Tag::Res2 => "Res2",
            Tag::IsPartOfList => "IsPartOfList",
            Tag::IsPartOf => "IsPartOf",
            Tag::WebServiceToolChain => "WebServiceToolChain",
            Tag::GeneralInfo => "GeneralInfo",
            Tag::Descriptions => "Descriptions",
            Tag::Description => "Description",
            Tag::ResourceName => "ResourceName",
            Tag::ResourceTitle => "ResourceTitle",
            Tag::ResourceClass => "ResourceClass",
            Tag::Version => "Version",
            Tag::LifeCycleStatus => "LifeCycleStatus",
            Tag::StartYear => "StartYear",
            Tag::CompletionYear => "CompletionYear",
            Tag::PublicationDate => "PublicationDate",
            Tag::LastUpdate => "LastUpdate",
            Tag::TimeCoverage => "TimeCoverage",
            Tag::LegalOwner => "LegalOwner",
            Tag::Genre => "Genre",
            Tag::Location => "Location",
            Tag::Address => "Address",
            Tag::Region => "Region",
            Tag::ContinentName => "ContinentName",
            Tag::Country => "Country",
            Tag::CountryName => "CountryName",
            Tag::CountryCoding => "CountryCoding",
            Tag::Tags => "Tags",
            Tag::Toolchain => "Toolchain",
            Tag::ToolInChain => "ToolInChain",
            Tag::Pid => "PID",
            Tag::Parameter => "Parameter",
            Tag::Other => "?",
        }
    }

    /// One of the four lexical-semantic relation layers.
    pub fn is_lexical_relation(self) -> bool {
        matches!(
            self,
            Tag::Synonymy | Tag::Antonymy | Tag::Hyponymy | Tag::Hyperonymy
        )
    }
}

/// Attribute names.
pub mod attr {
    pub const ID: &str = "ID";
    pub const TOKEN_IDS: &str = "tokenIDs";
    pub const TOK_ID: &str = "tokID";
    pub const CAT: &str = "cat";
    pub const TAGSET: &str = "tagset";
    pub const FUNC: &str = "func";
    pub const DEP_IDS: &str = "depIDs";
    pub const GOV_IDS: &str = "govIDs";
    pub const LANG: &str = "lang";
    pub const TYPE: &str = "type";
    pub const REL: &str = "rel";
    pub const TARGET: &str = "target";
    pub const TYPE_TAGSET: &str = "typetagset";
    pub const REL_TAGSET: &str = "reltagset";
    pub const CLASS: &str = "class";
    pub const TRANSCRIPTION: &str = "transcription";
    pub const OPERATION: &str = "operation";
    pub const ALT: &str = "alt";
    pub const LAT: &str = "lat";
    pub const LON: &str = "lon";
    pub const CONTINENT: &str = "continent";
    pub const COUNTRY: &str = "country";
    pub const CAPITAL: &str = "capital";
    pub const LEMMA_REFS: &str = "lemmaRefs";
    pub const SRC: &str = "src";
    pub const LEX_UNITS: &str = "lexunits";
    pub const COMMENT: &str = "comment";
    pub const START: &str = "start";
    pub const END: &str = "end";
    pub const NAME: &str = "name";
    pub const VALUE: &str = "value";
    pub const COMPONENT_ID: &str = "ComponentId";
    pub const CMD_VERSION: &str = "CMDVersion";
    pub const MIMETYPE: &str = "mimetype";
}

/// Layer names, also used as annotation namespaces.
pub mod layer {
    pub const SENTENCES: &str = "sentences";
    pub const POS: &str = "pos";
    pub const DEPENDENCIES: &str = "dependencies";
    pub const MORPHOLOGY: &str = "morphology";
    pub const CONSTITUENTS: &str = "syntax";
    pub const LEMMA: &str = "lemma";
    pub const REFERENCES: &str = "references";
    pub const NAMED_ENTITIES: &str = "named entities";
    pub const PHONETICS: &str = "phonetics";
    pub const ORTHOGRAPHY: &str = "orthography";
    pub const GEO: &str = "geography";
    pub const LEXICAL_SEMANTICS: &str = "lexical-semantics";
    pub const WORD_SENSE: &str = "wordSense";
    pub const SPLITTINGS: &str = "wordSplittings";
    pub const DISCOURSE: &str = "discourseConnectives";
    pub const TEXT_STRUCTURE: &str = "textstructure";
}

/// Namespace of the part-of-speech and lemma annotations.
pub const NS_SALT: &str = "salt";
pub const ANNO_POS: &str = "pos";
pub const ANNO_LEMMA: &str = "lemma";
/// Namespace of morphological segment annotations.
pub const NS_SEGMENT: &str = "segment";
/// Document metadata key holding the document name.
pub const META_DOCUMENT: &str = "document";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_names_round_trip() {
        for tag in [Tag::TextCorpus, Tag::PosTags, Tag::Pid, Tag::DiscourseConnectives, Tag::GPoint] {
            assert_eq!(Tag::from_local_name(tag.as_str()), tag);
        }
    }

    #[test]
    fn test_unknown_name() {
        assert_eq!(Tag::from_local_name("tokens"), Tag::Other);
        assert_eq!(Tag::from_local_name("Text"), Tag::Other);
    }

    #[test]
    fn test_phonetics_spellings() {
        assert_eq!(Tag::from_local_name("phonetics"), Tag::Phonetics);
        assert_eq!(Tag::from_local_name("Phonetics"), Tag::Phonetics);
    }
}
