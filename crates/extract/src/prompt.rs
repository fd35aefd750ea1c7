/// Instruction sent ahead of every chunk. The chunk itself goes in a
/// separate part of the same request.
pub const EXTRACTION_PROMPT: &str = r#"
From the provided text extracted from a PDF document, your task is to identify and extract entities and their relationships as specified.

Entities to extract:
1. Organisation: The name of a company or organization.
2. Name: The name of a person.
3. PAN: The 10-character alphanumeric Permanent Account Number (format: 5 letters + 4 digits + 1 letter, e.g., AAUFM6247N).

Relation to extract:
- PAN_Of: This is the relationship between a PAN and the entity (Person or Organisation) it belongs to.

INSTRUCTIONS:
- Carefully analyze the text, focusing on tables that list noticees/names alongside their corresponding PANs.
- For every PAN and Name/Organisation pair you find, create a JSON object.
- The final output must be ONLY a JSON array containing all these objects, with no other text.
- Each object in the array should have three keys: 'pan', 'relation', and 'entity'.
- The value for 'relation' should always be the string "PAN_Of".
- Ensure the extracted PAN and entity names are accurate and exactly as they appear in the text.
- PANs are typically 10 characters: 5 letters, 4 digits, 1 letter (e.g., AAUFM6247N).
- Only include entries where both PAN and entity name are clearly identifiable.
- Do not include any markdown formatting, explanations, or code blocks - ONLY the JSON array.

EXAMPLE OUTPUT:
[
  {
    "pan": "AAUFM6247N",
    "relation": "PAN_Of",
    "entity": "Mr. Agarwal"
  },
  {
    "pan": "AAACM9185B",
    "relation": "PAN_Of",
    "entity": "MAHESHWARI FINANCIAL SERVICES PVT. LTD."
  }
]

If no PAN-entity pairs are found, return: []
"#;

pub fn build_extraction_prompt() -> &'static str {
    EXTRACTION_PROMPT
}
