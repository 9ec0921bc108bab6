/*
** This file is a part of Ikswalk (forward-only XML walker from Iksemel)
** Copyright (C) 2025 Gurer Ozen
**
** Ikswalk is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use std::env;
use std::fs::File;
use std::io::Read;
use std::io::stdin;
use std::process::ExitCode;

use ikswalk::DepthIter;
use ikswalk::Element;
use ikswalk::Reader;
use ikswalk::ReaderError;
use ikswalk::ReaderOptions;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

fn print_version() {
    println!("ikswalk (iksemel) v{}", VERSION);
}

fn print_usage() {
    println!(
        concat!(
            "Usage: ikswalk [OPTIONS] [FILE.xml...]\n",
            "This tool prints the element outline of XML documents.\n",
            "Options:\n",
            "  -n, --name <NAME>    Only show top level children with this name\n",
            "  -p, --path           Print the path of each element\n",
            "  -t, --text           Print the trimmed text of leaf elements\n",
            "                       (loads each top level child into memory)\n",
            "  -b, --buffer <SIZE>  File read buffer size in bytes (default: {})\n",
            "  -h, --help           Display this help message and exit\n",
            "  -v, --version        Display the version and exit\n",
            "Set RUST_LOG=trace to see the iterator steps.\n",
            "Report issues at https://github.com/meduketto/iksemel-rust/issues"
        ),
        DEFAULT_BUFFER_SIZE
    );
}

struct Walker {
    name_filter: Option<String>,
    show_path: bool,
    show_text: bool,
    buffer_size: usize,
}

impl Walker {
    fn print_line(&self, name: &str, path: &str, text: Option<&str>, level: usize) {
        let mut line = "  ".repeat(level);
        line.push_str(name);
        if self.show_path {
            line.push_str(" [");
            line.push_str(path);
            line.push(']');
        }
        if let Some(text) = text {
            line.push_str(": ");
            line.push_str(text);
        }
        println!("{}", line);
    }

    fn print_element(&self, element: &Element, path: &str, level: usize) {
        let text = element.text();
        let text = text.trim();
        let is_leaf = element.elements().next().is_none();
        let text = if is_leaf && !text.is_empty() {
            Some(text)
        } else {
            None
        };
        self.print_line(&element.name, path, text, level);
        for child in element.elements() {
            let child_path = format!("{}/{}", path, child.name);
            self.print_element(child, &child_path, level + 1);
        }
    }

    fn walk_children<R: Read>(&self, iter: &mut DepthIter<'_, Reader<R>>, level: usize) {
        while iter.advance() {
            let path = iter.cursor().path();
            if self.show_text {
                if let Some(element) = iter.snapshot() {
                    self.print_element(element, &path, level);
                }
                continue;
            }
            let name = iter.name().unwrap_or_default().to_string();
            self.print_line(&name, &path, None, level);
            let mut children = iter.descend();
            self.walk_children(&mut children, level + 1);
        }
    }

    fn walk_file(&self, file: &str, is_stream: bool) -> bool {
        let source: Box<dyn Read> = if is_stream {
            Box::new(stdin())
        } else {
            match File::open(file) {
                Ok(f) => Box::new(f),
                Err(e) => {
                    eprintln!("Error reading file '{}': {}", file, e);
                    return false;
                }
            }
        };
        let options = ReaderOptions::default().with_buffer_size(self.buffer_size);
        let mut reader = Reader::with_options(source, options);

        let mut root = DepthIter::new(&mut reader);
        while root.advance() {
            let name = root.name().unwrap_or_default().to_string();
            self.print_line(&name, &root.cursor().path(), None, 0);
            let mut children = match &self.name_filter {
                Some(filter) => root.descend_named(filter),
                None => root.descend(),
            };
            self.walk_children(&mut children, 1);
        }

        match reader.last_error() {
            None => true,
            Some(ReaderError::Io(e)) => {
                eprintln!("Error reading file '{}': {}", file, e);
                false
            }
            Some(ReaderError::NoMemory) => {
                eprintln!("Memory allocation failed while parsing '{}'", file);
                false
            }
            Some(ReaderError::BadXml {
                description,
                location,
            }) => {
                eprintln!(
                    "Syntax error in file '{}' at line {} column {}: {}",
                    file, location.lines, location.column, description
                );
                false
            }
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let mut args = env::args();

    let mut files = Vec::new();
    let mut walker = Walker {
        name_filter: None,
        show_path: false,
        show_text: false,
        buffer_size: DEFAULT_BUFFER_SIZE,
    };

    // Skip the first argument (program name)
    args.next();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-n" | "--name" => {
                if let Some(name) = args.next() {
                    walker.name_filter = Some(name);
                } else {
                    eprintln!("Missing element name");
                    return ExitCode::FAILURE;
                }
            }
            "-p" | "--path" => {
                walker.show_path = true;
            }
            "-t" | "--text" => {
                walker.show_text = true;
            }
            "-pt" | "-tp" => {
                walker.show_path = true;
                walker.show_text = true;
            }
            "-b" | "--buffer" => {
                if let Some(size) = args.next() {
                    if let Ok(size) = size.parse::<usize>() {
                        walker.buffer_size = size;
                    } else {
                        eprintln!("Invalid buffer size");
                        return ExitCode::FAILURE;
                    }
                } else {
                    eprintln!("Missing buffer size");
                    return ExitCode::FAILURE;
                }
            }
            "-h" | "--help" => {
                print_usage();
                return ExitCode::SUCCESS;
            }
            "-v" | "--version" => {
                print_version();
                return ExitCode::SUCCESS;
            }
            _ => {
                files.push(arg);
            }
        }
    }

    if files.is_empty() {
        if !walker.walk_file("stdin", true) {
            return ExitCode::FAILURE;
        }
    } else {
        for file in files {
            if !walker.walk_file(&file, false) {
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
