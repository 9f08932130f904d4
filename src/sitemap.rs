use crate::error::SitemapError;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A `<loc>` element seen by the parser, waiting for its closing tag.
#[derive(Debug, Default)]
struct Pending {
    text: String,
    closed: bool,
}

/// Lazy iterator over the `<loc>` URLs of a sitemap document, in document order.
///
/// Every `<loc>` element anywhere in the tree yields one item, nested ones included;
/// namespaces are not enforced. The item is the concatenation of the element's direct
/// text and CDATA children, so a URL split by a comment is still returned in one piece.
/// Text of nested child elements is ignored and surrounding whitespace is trimmed.
///
/// Items come out in start-tag order: an outer `<loc>` is yielded before the `<loc>`
/// elements it contains, even though the inner ones close first.
///
/// The iterator stops after the first error. Iterating again requires reparsing.
pub struct Locations<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
    /// Number of currently open elements.
    depth: usize,
    /// Open `<loc>` elements as `(depth, index into pending)`, innermost last.
    open_locs: Vec<(usize, usize)>,
    /// Entries in start-tag order, not yet yielded.
    pending: VecDeque<Pending>,
    /// Number of entries already removed from the front of `pending`.
    yielded: usize,
    seen_root: bool,
    done: bool,
}

impl Locations<BufReader<File>> {
    /// Opens a sitemap file for lazy parsing.
    ///
    /// # Arguments
    ///
    /// * `path` - Path of the sitemap XML file.
    ///
    /// # Errors
    ///
    /// Returns [`SitemapError::Open`] if the file cannot be opened. Parse errors are
    /// only reported while iterating.
    pub fn from_path(path: &Path) -> Result<Self, SitemapError> {
        let file = File::open(path).map_err(|source| SitemapError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(Reader::from_reader(BufReader::new(file))))
    }
}

impl<'a> Locations<&'a [u8]> {
    /// Parses an in-memory sitemap document.
    pub fn from_xml(xml: &'a str) -> Self {
        Self::new(Reader::from_str(xml))
    }
}

impl<R: BufRead> Locations<R> {
    fn new(reader: Reader<R>) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            depth: 0,
            open_locs: Vec::new(),
            pending: VecDeque::new(),
            yielded: 0,
            seen_root: false,
            done: false,
        }
    }

    fn fail(&mut self, reason: &str) -> Option<Result<String, SitemapError>> {
        self.done = true;
        Some(Err(SitemapError::Malformed {
            position: self.reader.buffer_position(),
            reason: reason.to_string(),
        }))
    }

    /// Registers a new element at the current depth. Returns `false` for a second root.
    fn open_element(&mut self) -> bool {
        if self.depth == 0 {
            if self.seen_root {
                return false;
            }
            self.seen_root = true;
        }
        true
    }

    fn push_pending(&mut self, closed: bool) -> usize {
        self.pending.push_back(Pending {
            text: String::new(),
            closed,
        });
        self.yielded + self.pending.len() - 1
    }

    fn pending_mut(&mut self, index: usize) -> Option<&mut Pending> {
        self.pending.get_mut(index - self.yielded)
    }

    /// Pops the first entry if its element is closed. Later entries wait for it.
    fn pop_closed(&mut self) -> Option<String> {
        if !self.pending.front()?.closed {
            return None;
        }
        let entry = self.pending.pop_front()?;
        self.yielded += 1;
        Some(entry.text.trim().to_string())
    }
}

/// Owned summary of one XML event, so the reader buffer can be reused right away.
enum Token {
    Open { is_loc: bool },
    SelfClosing { is_loc: bool },
    Close,
    Text(Result<String, String>),
    Eof,
    Skip,
}

impl From<Event<'_>> for Token {
    fn from(event: Event<'_>) -> Self {
        match event {
            Event::Start(e) => Token::Open {
                is_loc: e.local_name().as_ref() == b"loc",
            },
            Event::Empty(e) => Token::SelfClosing {
                is_loc: e.local_name().as_ref() == b"loc",
            },
            Event::End(_) => Token::Close,
            Event::Text(e) => Token::Text(
                e.unescape()
                    .map(|t| t.into_owned())
                    .map_err(|e| e.to_string()),
            ),
            Event::CData(e) => Token::Text(Ok(String::from_utf8_lossy(&e).into_owned())),
            Event::Eof => Token::Eof,
            // Declarations, comments, processing instructions and doctypes carry no URLs.
            _ => Token::Skip,
        }
    }
}

impl<R: BufRead> Iterator for Locations<R> {
    type Item = Result<String, SitemapError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(url) = self.pop_closed() {
                return Some(Ok(url));
            }
            if self.done {
                return None;
            }

            self.buf.clear();
            let token = match self.reader.read_event_into(&mut self.buf) {
                Ok(event) => Token::from(event),
                Err(e) => {
                    self.done = true;
                    let position = self.reader.error_position();
                    return Some(Err(SitemapError::from_xml(e, position)));
                }
            };

            match token {
                Token::Open { is_loc } => {
                    if !self.open_element() {
                        return self.fail("more than one root element");
                    }
                    self.depth += 1;
                    if is_loc {
                        let index = self.push_pending(false);
                        self.open_locs.push((self.depth, index));
                    }
                }
                Token::SelfClosing { is_loc } => {
                    if !self.open_element() {
                        return self.fail("more than one root element");
                    }
                    // `<loc/>` still counts as an entry, with an empty URL.
                    if is_loc {
                        self.push_pending(true);
                    }
                }
                Token::Close => {
                    if self.depth == 0 {
                        return self.fail("unexpected closing tag");
                    }
                    if let Some(&(depth, index)) = self.open_locs.last() {
                        if depth == self.depth {
                            self.open_locs.pop();
                            if let Some(entry) = self.pending_mut(index) {
                                entry.closed = true;
                            }
                        }
                    }
                    self.depth -= 1;
                }
                Token::Text(Err(reason)) => return self.fail(&reason),
                Token::Text(Ok(text)) => {
                    if self.depth == 0 {
                        if !text.trim_start_matches('\u{feff}').trim().is_empty() {
                            return self.fail("text outside the root element");
                        }
                    } else if let Some(&(depth, index)) = self.open_locs.last() {
                        if depth == self.depth {
                            if let Some(entry) = self.pending_mut(index) {
                                entry.text.push_str(&text);
                            }
                        }
                    }
                }
                Token::Eof => {
                    if self.depth > 0 {
                        return self.fail("unclosed element at end of document");
                    }
                    if !self.seen_root {
                        return self.fail("no root element");
                    }
                    self.done = true;
                }
                Token::Skip => {}
            }
        }
    }
}

/// Extracts all `<loc>` URLs from a sitemap string.
///
/// # Errors
///
/// Returns [`SitemapError::Malformed`] if the document is not well-formed XML.
pub fn extract_locations(xml: &str) -> Result<Vec<String>, SitemapError> {
    Locations::from_xml(xml).collect()
}

/// Reads all `<loc>` URLs of a sitemap file.
///
/// The whole file is parsed before returning, so a malformed document is rejected
/// before a single request goes out.
///
/// # Arguments
///
/// * `path` - Path of the sitemap XML file, already resolved against the base directory.
///
/// # Returns
///
/// The URLs in document order, duplicates included.
///
/// # Errors
///
/// * [`SitemapError::Open`] if the file cannot be opened.
/// * [`SitemapError::Read`] if reading fails midway.
/// * [`SitemapError::Malformed`] if the document is not well-formed XML.
pub fn read_locations(path: &Path) -> Result<Vec<String>, SitemapError> {
    let urls = Locations::from_path(path)?.collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(path = %path.display(), count = urls.len(), "parsed sitemap");
    Ok(urls)
}
