/* Licensed to the Apache Software Foundation (ASF) under one
 * or more contributor license agreements.  See the NOTICE file
 * distributed with this work for additional information
 * regarding copyright ownership.  The ASF licenses this file
 * to you under the Apache License, Version 2.0 (the
 * "License"); you may not use this file except in compliance
 * with the License.  You may obtain a copy of the License at
 *
 *   http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing,
 * software distributed under the License is distributed on an
 * "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
 * KIND, either express or implied.  See the License for the
 * specific language governing permissions and limitations
 * under the License.
 */

use crate::types::ContentDocument;

/// Strips markup from a free-text field, decodes the common entities and
/// collapses runs of whitespace into single spaces.
pub fn strip_html_and_trim(input: &str) -> String {
    let mut text = String::with_capacity(input.len());
    let mut in_tag = false;

    for c in input.chars() {
        match c {
            '<' => {
                in_tag = true;
                text.push(' ');
            }
            '>' => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }

    // &amp; last so "&amp;lt;" decodes to "&lt;" and not "<"
    let decoded = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&");

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns a copy of the document with `description` and `content` replaced
/// by their plain-text equivalents. All other fields pass through unchanged.
pub fn sanitize(document: &ContentDocument) -> ContentDocument {
    let mut sanitized = document.clone();
    sanitized.description = strip_html_and_trim(&document.description);
    sanitized.content = strip_html_and_trim(&document.content);
    sanitized
}
