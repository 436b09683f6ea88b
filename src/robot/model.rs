//! Model
//!
//!     The parsed form of one file: `RobotFile -> Table -> element -> TokenId`. Every token
//!     lives in the file's [TokenArena](super::token::TokenArena); elements hold ids, and the
//!     original lines keep the ids and separators in file order so the dumper can rebuild the
//!     exact bytes.
//!
//!     Sections record the order in which table headers appeared (a table may be split over
//!     several headers). Table entries carry the id of the section they were read in, which
//!     is the only upward link any element has.
//!
//!     Test cases, tasks and keywords share one shape, [CodeElement], parameterized by a
//!     [RowOwner] marker. Outside the parser the model only changes through the operations in
//!     [update].

pub mod code_table;
pub mod descriptor;
pub mod elements;
pub mod file;
pub mod line;
pub mod outline;
pub mod row;
pub mod table;
pub mod update;

pub use code_table::{CodeTable, RowParts};
pub use descriptor::{DescriptorIssue, ForLoopParts, RowDescriptor, RowKind};
pub use elements::{CommentLine, DeclarationRow, EmptyLine, FreeRow, LocalSetting, Setting, TableHeader, Variable};
pub use file::RobotFile;
pub use line::{LineElement, RobotLine};
pub use outline::FileOutline;
pub use row::{
    BodyItem, CodeElement, ExecutableRow, KeywordOwner, RowOwner, Task, TaskOwner, TestCase,
    TestCaseOwner, UserKeyword,
};
pub use table::{Section, SectionId, SectionKind, Table, TableEntry, TableItem};
pub use update::UpdateError;
